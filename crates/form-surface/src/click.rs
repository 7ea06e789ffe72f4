use tracing::{debug, warn};

use crate::errors::InteractionError;
use crate::ports::{ClickMethod, ElementHandle, UiSurface};

/// Ordered list of click methods tried until one is accepted.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClickChain {
    methods: Vec<ClickMethod>,
}

impl Default for ClickChain {
    fn default() -> Self {
        Self::fallback_chain()
    }
}

impl ClickChain {
    pub fn new(methods: Vec<ClickMethod>) -> Self {
        if methods.is_empty() {
            return Self::fallback_chain();
        }
        Self { methods }
    }

    /// Pointer double activation, then direct click, then forced click.
    pub fn fallback_chain() -> Self {
        Self {
            methods: vec![
                ClickMethod::PointerDouble,
                ClickMethod::Direct,
                ClickMethod::Forced,
            ],
        }
    }

    /// Chain for toggles: a double activation would leave them unchanged.
    pub fn single_activation() -> Self {
        Self {
            methods: vec![ClickMethod::Direct, ClickMethod::Forced],
        }
    }

    pub fn methods(&self) -> &[ClickMethod] {
        &self.methods
    }

    /// Scrolls the element into view and tries each method in order.
    ///
    /// Stale and session errors end the chain at once, since no other method
    /// can succeed on the same handle.
    pub async fn activate(
        &self,
        surface: &dyn UiSurface,
        element: ElementHandle,
    ) -> Result<ClickMethod, InteractionError> {
        match surface.scroll_into_view(element).await {
            Ok(()) => {}
            Err(err) if err.is_fatal() || err.is_stale() => return Err(err),
            Err(err) => debug!(error = %err, "scroll into view failed; clicking anyway"),
        }

        let mut last_error = None;
        for (attempt, method) in self.methods.iter().enumerate() {
            match surface.click(element, *method).await {
                Ok(()) if attempt == 0 => {
                    debug!(method = method.name(), element = element.id, "click accepted");
                    return Ok(*method);
                }
                Ok(()) => {
                    warn!(method = method.name(), element = element.id, "click accepted by fallback method");
                    return Ok(*method);
                }
                Err(err) if err.is_fatal() || err.is_stale() => return Err(err),
                Err(err) => {
                    debug!(method = method.name(), error = %err, "click method rejected");
                    last_error = Some(err);
                }
            }
        }
        warn!(element = element.id, "every click method failed");
        Err(InteractionError::NotInteractable(match last_error {
            Some(err) => err.to_string(),
            None => "no click methods configured".to_string(),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_chain_falls_back_to_default_order() {
        assert_eq!(ClickChain::new(Vec::new()), ClickChain::fallback_chain());
    }

    #[test]
    fn toggles_never_double_activate() {
        assert!(!ClickChain::single_activation()
            .methods()
            .contains(&ClickMethod::PointerDouble));
    }
}
