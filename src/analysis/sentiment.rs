use std::fmt;

type ScoreFn = dyn Fn(&str) -> f64 + Send + Sync;

/// Lexicon-based polarity scorer.
///
/// Same text in, same compound score out, always within [-1, 1].
pub struct SentimentScorer {
    score_fn: Box<ScoreFn>,
    template: String,
}

impl SentimentScorer {
    /// VADER compound score over the bundled lexicon.
    pub fn vader(template: impl Into<String>) -> Self {
        let analyzer = vader_sentiment::SentimentIntensityAnalyzer::new();
        Self::from_fn(template, move |text| {
            analyzer
                .polarity_scores(text)
                .get("compound")
                .copied()
                .unwrap_or(0.0)
        })
    }

    pub fn from_fn<F>(template: impl Into<String>, f: F) -> Self
    where
        F: Fn(&str) -> f64 + Send + Sync + 'static,
    {
        Self {
            score_fn: Box::new(f),
            template: template.into(),
        }
    }

    /// Renders the news template for `symbol`.
    pub fn text_for(&self, symbol: &str) -> String {
        self.template.replace("{symbol}", symbol)
    }

    pub fn score(&self, text: &str) -> f64 {
        let raw = (self.score_fn)(text);
        if raw.is_nan() {
            0.0
        } else {
            raw.clamp(-1.0, 1.0)
        }
    }

    pub fn score_symbol(&self, symbol: &str) -> f64 {
        self.score(&self.text_for(symbol))
    }
}

impl fmt::Debug for SentimentScorer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SentimentScorer")
            .field("template", &self.template)
            .finish_non_exhaustive()
    }
}
