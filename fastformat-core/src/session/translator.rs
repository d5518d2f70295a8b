use tracing::{debug, error, info};

use super::card::VariantCard;
use crate::audio::AudioStore;
use crate::error::FormatError;
use crate::provider::RewriteProvider;
use crate::rewrite::RewriteResult;
use crate::variant::Variant;

/// A rewrite request detached from the translator. Hand the outcome back with
/// [`Translator::finish_rewrite`].
#[derive(Debug, Clone)]
pub struct RewriteRequest {
    text: String,
    generation: u64,
}

impl RewriteRequest {
    pub fn text(&self) -> &str {
        &self.text
    }

    pub async fn run(&self, provider: &dyn RewriteProvider) -> Result<RewriteResult, FormatError> {
        provider.rewrite(&self.text).await
    }
}

/// Collects input, dispatches the rewrite and owns the three variant cards.
pub struct Translator {
    input: String,
    result: Option<RewriteResult>,
    error: Option<FormatError>,
    loading: bool,
    generation: u64,
    cards: Vec<VariantCard>,
}

impl Translator {
    pub fn new(store: AudioStore) -> Self {
        let cards = Variant::all()
            .iter()
            .map(|v| VariantCard::new(*v, store.clone()))
            .collect();
        Self {
            input: String::new(),
            result: None,
            error: None,
            loading: false,
            generation: 0,
            cards,
        }
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn result(&self) -> Option<&RewriteResult> {
        self.result.as_ref()
    }

    pub fn error(&self) -> Option<&FormatError> {
        self.error.as_ref()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Text for the error banner, including remediation steps when there are any.
    pub fn banner(&self) -> Option<String> {
        let error = self.error.as_ref()?;
        Some(match error.remediation() {
            Some(help) => format!("{error}\n{help}"),
            None => error.to_string(),
        })
    }

    pub fn card(&self, variant: Variant) -> &VariantCard {
        self.cards
            .iter()
            .find(|c| c.variant() == variant)
            .expect("a card exists for every variant")
    }

    pub fn card_mut(&mut self, variant: Variant) -> &mut VariantCard {
        self.cards
            .iter_mut()
            .find(|c| c.variant() == variant)
            .expect("a card exists for every variant")
    }

    pub fn cards(&self) -> &[VariantCard] {
        &self.cards
    }

    pub fn cards_mut(&mut self) -> &mut [VariantCard] {
        &mut self.cards
    }

    /// Start a rewrite of `input`. Blank input is ignored.
    ///
    /// The previous result is cleared right away and any request still in
    /// flight is superseded.
    pub fn begin_rewrite(&mut self, input: &str) -> Option<RewriteRequest> {
        self.input = input.to_string();
        if input.trim().is_empty() {
            return None;
        }

        self.generation += 1;
        self.loading = true;
        self.error = None;
        self.set_result(None);

        Some(RewriteRequest {
            text: input.to_string(),
            generation: self.generation,
        })
    }

    /// Apply a rewrite outcome. Returns false if the request was superseded
    /// and its outcome discarded.
    pub fn finish_rewrite(
        &mut self,
        request: RewriteRequest,
        outcome: Result<RewriteResult, FormatError>,
    ) -> bool {
        if request.generation != self.generation {
            debug!(
                request = request.generation,
                current = self.generation,
                "Discarding superseded rewrite"
            );
            return false;
        }
        self.loading = false;

        match outcome {
            Ok(result) => {
                info!("Rewrite complete");
                self.set_result(Some(result));
            }
            Err(e) => {
                error!(?e, "Rewrite error");
                self.error = Some(e);
            }
        }
        true
    }

    /// Rewrite `input` and wait for the answer.
    pub async fn rewrite(&mut self, provider: &dyn RewriteProvider, input: &str) -> bool {
        let Some(request) = self.begin_rewrite(input) else {
            return false;
        };
        let outcome = request.run(provider).await;
        self.finish_rewrite(request, outcome)
    }

    /// Reset input, result and error. Requests still in flight are discarded.
    pub fn clear(&mut self) {
        self.input.clear();
        self.error = None;
        self.loading = false;
        self.generation += 1;
        self.set_result(None);
    }

    fn set_result(&mut self, result: Option<RewriteResult>) {
        for card in &mut self.cards {
            let content = result
                .as_ref()
                .map(|r| r.get(card.variant()))
                .unwrap_or_default();
            card.set_content(content);
        }
        self.result = result;
    }
}
