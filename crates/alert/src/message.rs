//! Alert text and link annotations.
//!
//! Each wallet address in the text is covered by a link annotation. Offsets
//! are accumulated while the text is written, line by line, and counted in
//! UTF-16 code units (the unit Telegram uses for entity offsets). For ASCII
//! text this is the same as the byte count.

use balance::{Amount, Breach, ADDRESS_LEN};
use config::NetworkConfig;
use serde::Serialize;

/// A link over `length` units of the alert text, starting at `offset`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LinkAnnotation {
    pub offset: usize,
    pub length: usize,
    pub url: String,
}

/// A rendered alert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlertMessage {
    pub text: String,
    pub links: Vec<LinkAnnotation>,
}

/// Layout of the alert body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageStyle {
    /// All assets share one threshold; the preamble states it and asset
    /// lines carry only the symbol.
    ThresholdSummary { threshold: Amount },
    /// Assets have their own thresholds; asset lines carry the balance.
    TopUp,
}

pub struct MessageComposer {
    network: NetworkConfig,
    style: MessageStyle,
}

impl MessageComposer {
    pub const fn new(network: NetworkConfig, style: MessageStyle) -> Self {
        Self { network, style }
    }

    pub const fn style(&self) -> &MessageStyle {
        &self.style
    }

    pub fn preamble(&self) -> String {
        let chain = &self.network.chain_name;
        match &self.style {
            MessageStyle::ThresholdSummary { threshold } => format!(
                "The following {chain} accounts' tokens have balance less than {threshold}: \n\n"
            ),
            MessageStyle::TopUp => {
                format!("The following {chain} accounts need to be topped up: \n\n")
            }
        }
    }

    /// Render `breaches`, which must be grouped by wallet as the evaluator
    /// produces them.
    pub fn compose(&self, breaches: &[Breach]) -> AlertMessage {
        let mut text = self.preamble();
        let mut offset = utf16_len(&text);
        let mut links = Vec::new();

        for group in breaches.chunk_by(|a, b| a.wallet == b.wallet) {
            let wallet = &group[0].wallet;

            links.push(LinkAnnotation {
                offset,
                length: ADDRESS_LEN,
                url: self.network.address_url(wallet.as_str()),
            });
            offset += push_line(&mut text, wallet.as_str());

            for breach in group {
                let line = match self.style {
                    MessageStyle::ThresholdSummary { .. } => format!("- {}", breach.symbol),
                    MessageStyle::TopUp => format!("- {} {}", breach.balance, breach.symbol),
                };
                offset += push_line(&mut text, &line);
            }
        }

        AlertMessage { text, links }
    }
}

fn utf16_len(s: &str) -> usize {
    s.encode_utf16().count()
}

/// Append `line` and a newline, returning the appended length.
fn push_line(text: &mut String, line: &str) -> usize {
    text.push_str(line);
    text.push('\n');
    utf16_len(line) + 1
}
