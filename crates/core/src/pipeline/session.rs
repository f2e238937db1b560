//! Shared browser-session helpers.

use std::time::Duration;

use crate::browser::{BrowserError, BrowserSession, ElementRef};

/// Waits for an element and clicks it.
pub(super) async fn click_when_ready(
    session: &dyn BrowserSession,
    selector: &str,
    timeout: Duration,
) -> Result<ElementRef, BrowserError> {
    let element = session.wait_for_element(selector, timeout).await?;
    session.click(&element).await?;
    Ok(element)
}

/// Replaces the content of an input field.
pub(super) async fn fill_input(
    session: &dyn BrowserSession,
    selector: &str,
    text: &str,
    timeout: Duration,
) -> Result<ElementRef, BrowserError> {
    let element = session.wait_for_element(selector, timeout).await?;
    session.clear(&element).await?;
    session.type_text(&element, text).await?;
    Ok(element)
}

/// Escapes a value for use inside a double-quoted CSS attribute selector.
pub(super) fn css_string(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_css_string_escapes_quotes() {
        assert_eq!(css_string(r#"Say "hi""#), r#"Say \"hi\""#);
        assert_eq!(css_string("Paris"), "Paris");
    }
}
