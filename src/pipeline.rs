use anyhow::Context;

#[cfg(test)]
use mockall::automock;

use crate::{
    analysis::{Detection, MatchRules},
    locate::LocatedImage,
    storage::BlobClient,
    telegram::TelegramClient,
    vision::{Analysis, VisionClient},
};

#[cfg_attr(test, automock)]
pub trait ImageAnalyzer {
    fn analyze(&self, image: &LocatedImage) -> anyhow::Result<Analysis>;
}

#[cfg_attr(test, automock)]
pub trait Notifier {
    fn send_message(&self, text: &str) -> anyhow::Result<()>;
    fn send_photo(&self, image: &LocatedImage, caption: Option<String>) -> anyhow::Result<()>;
}

#[cfg_attr(test, automock)]
pub trait Archiver {
    /// Returns where the image was archived to
    fn archive(&self, image: &LocatedImage) -> anyhow::Result<String>;
}

impl ImageAnalyzer for VisionClient {
    fn analyze(&self, image: &LocatedImage) -> anyhow::Result<Analysis> {
        VisionClient::analyze(self, image)
    }
}

impl Notifier for TelegramClient {
    fn send_message(&self, text: &str) -> anyhow::Result<()> {
        TelegramClient::send_message(self, text)
    }

    fn send_photo(&self, image: &LocatedImage, caption: Option<String>) -> anyhow::Result<()> {
        TelegramClient::send_photo(self, image, caption.as_deref())
    }
}

impl Archiver for BlobClient {
    fn archive(&self, image: &LocatedImage) -> anyhow::Result<String> {
        self.upload(image)
    }
}

#[derive(Debug, PartialEq)]
pub enum Outcome {
    NoMatch,
    /// Matched, but notification was skipped
    Matched(Detection),
    Notified {
        detection: Detection,
        archived: Option<String>,
    },
}

pub struct Pipeline<'a> {
    pub analyzer: &'a dyn ImageAnalyzer,
    pub rules: &'a MatchRules,
    pub notifier: &'a dyn Notifier,
    pub archiver: Option<&'a dyn Archiver>,
    pub message: &'a str,
    pub dry_run: bool,
}

impl Pipeline<'_> {
    pub fn run(&self, image: &LocatedImage) -> anyhow::Result<Outcome> {
        let analysis = self
            .analyzer
            .analyze(image)
            .with_context(|| format!("analyzing {:?}", image.path))?;

        let Some(detection) = self.rules.evaluate(&analysis) else {
            tracing::info!("No match found. Not sending message");
            return Ok(Outcome::NoMatch);
        };

        let summary = detection.summary();
        tracing::info!(
            "{summary}; best confidence {:.0}%",
            detection.best_score() * 100.0
        );

        if self.dry_run {
            tracing::info!("Dry run, not sending message");
            return Ok(Outcome::Matched(detection));
        }

        self.notifier
            .send_message(self.message)
            .context("sending message")?;
        self.notifier
            .send_photo(image, Some(summary))
            .context("sending photo")?;

        let archived = match self.archiver {
            Some(archiver) => Some(
                archiver
                    .archive(image)
                    .with_context(|| format!("archiving {:?}", image.path))?,
            ),
            None => None,
        };

        Ok(Outcome::Notified {
            detection,
            archived,
        })
    }
}
