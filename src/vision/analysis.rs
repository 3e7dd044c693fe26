use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Tag {
    pub name: String,
    #[serde(default)]
    pub confidence: f32,
}

/// An object hierarchy step, e.g. `dog` has parent `mammal` which has parent `animal`
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ObjectParent {
    pub object: String,
    #[serde(default)]
    pub confidence: f32,
    pub parent: Option<Box<ObjectParent>>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DetectedObject {
    pub object: String,
    #[serde(default)]
    pub confidence: f32,
    pub parent: Option<ObjectParent>,
}

impl DetectedObject {
    /// The object's own name followed by every ancestor name
    pub fn names(&self) -> Vec<&str> {
        let mut names = vec![self.object.as_str()];
        let mut next = self.parent.as_ref();
        while let Some(parent) = next {
            names.push(parent.object.as_str());
            next = parent.parent.as_deref();
        }
        names
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Caption {
    pub text: String,
    #[serde(default)]
    pub confidence: f32,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Description {
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub captions: Vec<Caption>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Metadata {
    pub width: u32,
    pub height: u32,
    pub format: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Analysis {
    #[serde(default)]
    pub tags: Vec<Tag>,
    #[serde(default)]
    pub objects: Vec<DetectedObject>,
    #[serde(default)]
    pub description: Description,
    pub request_id: Option<String>,
    pub metadata: Option<Metadata>,
}

impl Analysis {
    pub fn object_names(&self) -> Vec<&str> {
        self.objects.iter().map(|o| o.object.as_str()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RESPONSE: &str = r#"{
        "tags": [
            { "name": "outdoor", "confidence": 0.99 },
            { "name": "person", "confidence": 0.95 },
            { "name": "clothing", "confidence": 0.91 }
        ],
        "faces": [],
        "objects": [
            {
                "rectangle": { "x": 12, "y": 30, "w": 200, "h": 340 },
                "object": "dog",
                "confidence": 0.82,
                "parent": {
                    "object": "mammal",
                    "confidence": 0.9,
                    "parent": { "object": "animal", "confidence": 0.91 }
                }
            },
            { "object": "person", "confidence": 0.7 }
        ],
        "description": {
            "tags": ["outdoor", "grass"],
            "captions": [{ "text": "a person walking a dog", "confidence": 0.64 }]
        },
        "requestId": "0a1b2c",
        "metadata": { "width": 640, "height": 480, "format": "Jpeg" }
    }"#;

    #[test]
    fn parses_full_response() {
        let analysis: Analysis = serde_json::from_str(RESPONSE).unwrap();

        assert_eq!(analysis.tags.len(), 3);
        assert_eq!(analysis.object_names(), vec!["dog", "person"]);
        assert_eq!(analysis.objects[0].names(), vec!["dog", "mammal", "animal"]);
        assert_eq!(analysis.objects[1].names(), vec!["person"]);
        assert_eq!(analysis.description.captions[0].text, "a person walking a dog");
        assert_eq!(analysis.request_id.as_deref(), Some("0a1b2c"));
        assert_eq!(analysis.metadata.unwrap().width, 640);
    }

    #[test]
    fn missing_lists_are_empty() {
        let analysis: Analysis = serde_json::from_str(r#"{ "requestId": "x" }"#).unwrap();

        assert!(analysis.tags.is_empty());
        assert!(analysis.objects.is_empty());
        assert!(analysis.description.captions.is_empty());
    }
}
