#[derive(Debug, PartialEq)]
struct WordDef {
    pub start: usize,
    pub len: usize,
}

/// Lowercased text split into words. Hyphens join their neighbours ("man-made" is one word),
/// any other punctuation separates words.
#[derive(Debug, PartialEq)]
pub struct Words {
    phrase: String,
    words: Vec<WordDef>,
}

impl Words {
    pub fn clean(text: &mut String) {
        text.make_ascii_lowercase();
        *text = text
            .chars()
            .filter(|c| *c != '-')
            .map(|c| if allowed_char(c) { c } else { ' ' })
            .collect();
    }

    pub fn new(phrase: impl Into<String>) -> Self {
        let mut phrase: String = phrase.into();

        Self::clean(&mut phrase);

        let bytes = phrase.as_bytes();

        let mut last = 0;
        let mut words = Vec::new();

        let mut idx = 0;
        while idx < bytes.len() {
            let c = bytes[idx];
            if matches!(c, b' ' | b'\t' | b'\n') {
                if idx > last {
                    words.push(WordDef {
                        start: last,
                        len: idx - last,
                    });
                }
                last = idx + 1;
            }

            idx += 1;
        }

        if idx > last {
            words.push(WordDef {
                start: last,
                len: idx - last,
            });
        }

        Self { words, phrase }
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    pub fn iter_words(&self) -> impl Iterator<Item = &str> {
        self.words
            .iter()
            .map(|w| &self.phrase[w.start..w.start + w.len])
    }

    pub fn as_words(&self) -> Vec<&str> {
        self.iter_words().collect()
    }

    /// Whether `needle` occurs in these words as a contiguous run of whole words
    pub fn contains(&self, needle: &Words) -> bool {
        if needle.is_empty() || needle.len() > self.len() {
            return false;
        }

        let haystack = self.as_words();
        let needle = needle.as_words();
        haystack.windows(needle.len()).any(|window| window == needle)
    }
}

fn allowed_char(c: char) -> bool {
    match c {
        'a'..='z' => true,
        '0'..='9' => true,
        ' ' | '\t' | '\n' => true,
        _ => false,
    }
}
