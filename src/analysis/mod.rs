use std::fmt;

use crate::{
    config::RulesConfig,
    utils::{LowercaseString, Words},
    vision::Analysis,
};

#[derive(Debug, Clone, PartialEq)]
pub enum MatchReason {
    /// A detected object, or one of its ancestors, is interesting
    Object {
        object: String,
        matched: String,
        confidence: f32,
    },
    Tag {
        name: String,
        confidence: f32,
    },
    Caption {
        text: String,
        phrase: String,
        confidence: f32,
    },
}

impl MatchReason {
    pub fn confidence(&self) -> f32 {
        match self {
            Self::Object { confidence, .. }
            | Self::Tag { confidence, .. }
            | Self::Caption { confidence, .. } => *confidence,
        }
    }
}

impl fmt::Display for MatchReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Object {
                object,
                matched,
                confidence,
            } if object.eq_ignore_ascii_case(matched) => {
                write!(f, "object {object} ({:.0}%)", confidence * 100.0)
            }
            Self::Object {
                object,
                matched,
                confidence,
            } => write!(f, "object {object} as {matched} ({:.0}%)", confidence * 100.0),
            Self::Tag { name, confidence } => write!(f, "tag {name} ({:.0}%)", confidence * 100.0),
            Self::Caption {
                text,
                phrase,
                confidence,
            } => write!(
                f,
                "caption \"{text}\" has \"{phrase}\" ({:.0}%)",
                confidence * 100.0
            ),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Detection {
    pub reasons: Vec<MatchReason>,
}

impl Detection {
    pub fn new() -> Self {
        Self {
            reasons: Vec::new(),
        }
    }

    pub fn add(&mut self, reason: MatchReason) {
        self.reasons.push(reason);
    }

    pub fn finish(self) -> Option<Self> {
        if self.reasons.is_empty() {
            None
        } else {
            Some(self)
        }
    }

    pub fn best_score(&self) -> f32 {
        self.reasons
            .iter()
            .map(MatchReason::confidence)
            .fold(0.0, f32::max)
    }

    /// One line listing every reason, used in the log and as the photo caption
    pub fn summary(&self) -> String {
        let reasons: Vec<String> = self.reasons.iter().map(|r| r.to_string()).collect();
        format!("Matched {}", reasons.join(", "))
    }
}

pub struct MatchRules {
    objects: Vec<LowercaseString>,
    tags: Vec<LowercaseString>,
    phrases: Vec<(LowercaseString, Words)>,
    min_confidence: f32,
}

fn find<'a>(set: &'a [LowercaseString], name: &str) -> Option<&'a LowercaseString> {
    set.iter().find(|item| item.eq_ignore_case(name))
}

impl MatchRules {
    pub fn new(config: &RulesConfig) -> Self {
        let phrases = config
            .phrases
            .iter()
            .map(|p| (p.clone(), Words::new(p.as_str())))
            .filter(|(_, words)| !words.is_empty())
            .collect();

        Self {
            objects: config.objects.clone(),
            tags: config.tags.clone(),
            phrases,
            min_confidence: config.min_confidence,
        }
    }

    fn check_objects(&self, analysis: &Analysis, detection: &mut Detection) {
        for object in &analysis.objects {
            let matched = object
                .names()
                .into_iter()
                .find_map(|name| find(&self.objects, name));
            if let Some(matched) = matched {
                detection.add(MatchReason::Object {
                    object: object.object.clone(),
                    matched: matched.to_string(),
                    confidence: object.confidence,
                });
            }
        }
    }

    fn check_tags(&self, analysis: &Analysis, detection: &mut Detection) {
        for tag in &analysis.tags {
            if tag.confidence >= self.min_confidence && find(&self.tags, &tag.name).is_some() {
                detection.add(MatchReason::Tag {
                    name: tag.name.clone(),
                    confidence: tag.confidence,
                });
            }
        }

        // description tags come without a confidence of their own
        let already: Vec<String> = detection
            .reasons
            .iter()
            .filter_map(|r| match r {
                MatchReason::Tag { name, .. } => Some(name.to_ascii_lowercase()),
                _ => None,
            })
            .collect();
        for name in &analysis.description.tags {
            if find(&self.tags, name).is_some() && !already.contains(&name.to_ascii_lowercase()) {
                detection.add(MatchReason::Tag {
                    name: name.clone(),
                    confidence: 1.0,
                });
            }
        }
    }

    fn check_captions(&self, analysis: &Analysis, detection: &mut Detection) {
        for caption in &analysis.description.captions {
            if caption.confidence < self.min_confidence {
                continue;
            }

            let words = Words::new(caption.text.as_str());
            if let Some((phrase, _)) = self.phrases.iter().find(|(_, p)| words.contains(p)) {
                detection.add(MatchReason::Caption {
                    text: caption.text.clone(),
                    phrase: phrase.to_string(),
                    confidence: caption.confidence,
                });
            }
        }
    }

    /// Returns why the analysis is interesting, or `None` if it isn't
    pub fn evaluate(&self, analysis: &Analysis) -> Option<Detection> {
        let mut detection = Detection::new();
        self.check_objects(analysis, &mut detection);
        self.check_tags(analysis, &mut detection);
        self.check_captions(analysis, &mut detection);
        detection.finish()
    }
}
