// Copyright 2025 Adobe. All rights reserved.
// This file is licensed to you under the Apache License,
// Version 2.0 (http://www.apache.org/licenses/LICENSE-2.0)
// or the MIT license (http://opensource.org/licenses/MIT),
// at your option.

// Unless required by applicable law or agreed to in writing,
// this software is distributed on an "AS IS" BASIS, WITHOUT
// WARRANTIES OR REPRESENTATIONS OF ANY KIND, either express or
// implied. See the LICENSE-MIT and LICENSE-APACHE files for the
// specific language governing permissions and limitations under
// each license.

//! Construction of webhook responses.
//!
//! Pure data shaping: these types serialize into the JSON document the
//! platform expects and carry no trust-boundary logic.

use serde::Serialize;
use serde_json::{Map, Value};

use crate::Result;

const RESPONSE_FORMAT_VERSION: &str = "1.0";

/// Spoken output, used for both the main speech and reprompts.
#[derive(Clone, Debug, Serialize)]
#[serde(tag = "type")]
pub enum OutputSpeech {
    /// Plain text to be rendered by the device's default voice.
    #[serde(rename = "PlainText")]
    PlainText {
        /// The text to speak.
        text: String,
    },

    /// Speech Synthesis Markup Language.
    #[serde(rename = "SSML")]
    Ssml {
        /// The SSML document to render.
        ssml: String,
    },
}

impl OutputSpeech {
    /// Plain-text speech.
    pub fn plain(text: impl Into<String>) -> Self {
        Self::PlainText { text: text.into() }
    }

    /// SSML speech.
    pub fn ssml(ssml: impl Into<String>) -> Self {
        Self::Ssml { ssml: ssml.into() }
    }
}

/// Image URLs for a standard card.
#[derive(Clone, Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Image {
    /// URL of the small-format image.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub small_image_url: Option<String>,

    /// URL of the large-format image.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub large_image_url: Option<String>,
}

/// A card shown in the companion app. Only meaningful when answering a
/// `LaunchRequest` or `IntentRequest`.
#[derive(Clone, Debug, Serialize)]
#[serde(tag = "type")]
pub enum Card {
    /// A card with a title and plain text content.
    Simple {
        /// Title of the card.
        #[serde(skip_serializing_if = "Option::is_none")]
        title: Option<String>,

        /// Text content of the card.
        #[serde(skip_serializing_if = "Option::is_none")]
        content: Option<String>,
    },

    /// A card with a title, text, and an optional image.
    Standard {
        /// Title of the card.
        #[serde(skip_serializing_if = "Option::is_none")]
        title: Option<String>,

        /// Text content of the card.
        #[serde(skip_serializing_if = "Option::is_none")]
        text: Option<String>,

        /// Image to display.
        #[serde(skip_serializing_if = "Option::is_none")]
        image: Option<Image>,
    },

    /// Prompts the user to link their account.
    LinkAccount,
}

impl Card {
    /// A simple card with a title and content.
    pub fn simple(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self::Simple {
            title: Some(title.into()),
            content: Some(content.into()),
        }
    }

    /// A standard card with a title, text, and an optional image.
    pub fn standard(
        title: impl Into<String>,
        text: impl Into<String>,
        image: Option<Image>,
    ) -> Self {
        Self::Standard {
            title: Some(title.into()),
            text: Some(text.into()),
            image,
        }
    }

    /// An account-linking card.
    pub fn link_account() -> Self {
        Self::LinkAccount
    }
}

/// A reprompt, spoken when the user stays silent after an open-ended
/// response.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Reprompt {
    /// The speech to render.
    pub output_speech: OutputSpeech,
}

impl Reprompt {
    /// Build a reprompt around the given speech.
    pub fn new(output_speech: OutputSpeech) -> Self {
        Self { output_speech }
    }
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ResponseBody {
    #[serde(skip_serializing_if = "Option::is_none")]
    output_speech: Option<OutputSpeech>,

    #[serde(skip_serializing_if = "Option::is_none")]
    card: Option<Card>,

    #[serde(skip_serializing_if = "Option::is_none")]
    reprompt: Option<Reprompt>,

    should_end_session: bool,
}

/// A complete webhook response, ready to serialize.
///
/// By default the response ends the session; call
/// [`ResponseEnvelope::keep_session_open`] for multi-turn interactions.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseEnvelope {
    version: String,

    #[serde(skip_serializing_if = "Map::is_empty")]
    session_attributes: Map<String, Value>,

    response: ResponseBody,
}

impl ResponseEnvelope {
    /// An empty response: no speech, no card, session ended.
    pub fn new() -> Self {
        Self {
            version: RESPONSE_FORMAT_VERSION.to_owned(),
            session_attributes: Map::new(),
            response: ResponseBody {
                output_speech: None,
                card: None,
                reprompt: None,
                should_end_session: true,
            },
        }
    }

    /// The most basic useful response: the same text spoken aloud and shown
    /// on a simple card, ending the session.
    pub fn basic(text: impl Into<String>) -> Self {
        let text = text.into();

        Self::new()
            .with_speech(OutputSpeech::plain(text.clone()))
            .with_card(Card::simple("Response", text))
    }

    /// Set the spoken output.
    pub fn with_speech(mut self, speech: OutputSpeech) -> Self {
        self.response.output_speech = Some(speech);
        self
    }

    /// Set the card shown in the companion app.
    pub fn with_card(mut self, card: Card) -> Self {
        self.response.card = Some(card);
        self
    }

    /// Set the reprompt speech.
    pub fn with_reprompt(mut self, speech: OutputSpeech) -> Self {
        self.response.reprompt = Some(Reprompt::new(speech));
        self
    }

    /// Store a session attribute to be echoed back on the next request.
    pub fn with_session_attribute(mut self, key: impl Into<String>, value: Value) -> Self {
        self.session_attributes.insert(key.into(), value);
        self
    }

    /// Leave the session open so the user can answer.
    pub fn keep_session_open(mut self) -> Self {
        self.response.should_end_session = false;
        self
    }

    /// Serialize to the JSON document to send back to the platform.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

impl Default for ResponseEnvelope {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use serde_json::json;

    use super::*;

    #[test]
    fn basic_response_shape() {
        let response = ResponseEnvelope::basic("Hello, world");
        let value: Value = serde_json::from_str(&response.to_json().unwrap()).unwrap();

        assert_eq!(
            value,
            json!({
                "version": "1.0",
                "response": {
                    "outputSpeech": { "type": "PlainText", "text": "Hello, world" },
                    "card": { "type": "Simple", "title": "Response", "content": "Hello, world" },
                    "shouldEndSession": true
                }
            })
        );
    }

    #[test]
    fn open_ended_response_with_reprompt_and_attributes() {
        let response = ResponseEnvelope::new()
            .with_speech(OutputSpeech::ssml("<speak>What next?</speak>"))
            .with_reprompt(OutputSpeech::plain("Still there?"))
            .with_session_attribute("count", json!(2))
            .keep_session_open();

        let value: Value = serde_json::from_str(&response.to_json().unwrap()).unwrap();

        assert_eq!(
            value,
            json!({
                "version": "1.0",
                "sessionAttributes": { "count": 2 },
                "response": {
                    "outputSpeech": { "type": "SSML", "ssml": "<speak>What next?</speak>" },
                    "reprompt": {
                        "outputSpeech": { "type": "PlainText", "text": "Still there?" }
                    },
                    "shouldEndSession": false
                }
            })
        );
    }

    #[test]
    fn link_account_card() {
        let response = ResponseEnvelope::new().with_card(Card::link_account());
        let value: Value = serde_json::from_str(&response.to_json().unwrap()).unwrap();

        assert_eq!(value["response"]["card"], json!({ "type": "LinkAccount" }));
    }

    #[test]
    fn standard_card_with_image() {
        let card = Card::standard(
            "Title",
            "Some text",
            Some(Image {
                small_image_url: Some("https://img.test/small.png".to_owned()),
                large_image_url: None,
            }),
        );

        let response = ResponseEnvelope::new().with_card(card);
        let value: Value = serde_json::from_str(&response.to_json().unwrap()).unwrap();

        assert_eq!(
            value["response"]["card"],
            json!({
                "type": "Standard",
                "title": "Title",
                "text": "Some text",
                "image": { "smallImageUrl": "https://img.test/small.png" }
            })
        );
    }
}
