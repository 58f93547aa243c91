//! Quote tracking state machine
//!
//! The splitter cuts a line on every delimiter first; this machine then walks
//! each component and decides whether the quoted field it belongs to is still
//! open when the component ends. Doubled quotes are resolved here, so no
//! sentinel substitution is needed.

use crate::constants::QUOTE;

/// Quote state carried from one component to the next
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuoteState {
    /// Not inside a quoted field; the next delimiter ends the field
    Outside,
    /// Inside a quoted field; a delimiter here is literal text
    InsideQuote,
    /// Just saw a quote inside a quoted field: either a closing quote or the
    /// first half of an escaped `""`
    ClosingCandidate,
}

impl QuoteState {
    /// Start a field from its first raw component, appending literal text to `out`
    pub fn open(component: &str, out: &mut String) -> Self {
        match component.strip_prefix(QUOTE) {
            Some(rest) => QuoteState::InsideQuote.advance(rest, out),
            None => {
                push_unquoted(component, out);
                QuoteState::Outside
            }
        }
    }

    /// Consume one segment of text in this state, appending literal text to `out`
    ///
    /// Text following a closing quote is treated as unquoted.
    pub fn advance(self, segment: &str, out: &mut String) -> Self {
        let mut state = self;
        for (idx, c) in segment.char_indices() {
            state = match (state, c) {
                (QuoteState::InsideQuote, QUOTE) => QuoteState::ClosingCandidate,
                (QuoteState::InsideQuote, c) => {
                    out.push(c);
                    QuoteState::InsideQuote
                }
                (QuoteState::ClosingCandidate, QUOTE) => {
                    out.push(QUOTE);
                    QuoteState::InsideQuote
                }
                (QuoteState::ClosingCandidate, _) | (QuoteState::Outside, _) => {
                    push_unquoted(&segment[idx..], out);
                    return QuoteState::Outside;
                }
            };
        }
        state
    }

    /// Whether a delimiter met in this state belongs to the field text
    pub fn is_open(self) -> bool {
        self == QuoteState::InsideQuote
    }
}

/// Append unquoted text: `""` becomes one literal quote, a lone quote is dropped
pub fn push_unquoted(text: &str, out: &mut String) {
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        if c != QUOTE {
            out.push(c);
        } else if chars.next_if_eq(&QUOTE).is_some() {
            out.push(QUOTE);
        }
    }
}
