//! Recipe suggestions
//!
//! Asks a hosted text-generation API for a recipe that uses what is in the
//! pantry and turns the reply into ingredient requirements the ledger can
//! check.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::json;
use thiserror::Error;

use crate::models::{IngredientRequirement, PantryItem};

const DEFAULT_ENDPOINT: &str = "https://api.anthropic.com/v1/messages";
const DEFAULT_MODEL: &str = "claude-3-5-haiku-latest";
const API_VERSION: &str = "2023-06-01";
const MAX_TOKENS: u32 = 1500;

/// Recipe suggestion errors
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("No API key configured (set HOMELOG_ANTHROPIC_API_KEY or ANTHROPIC_API_KEY)")]
    MissingApiKey,

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API returned {status}: {body}")]
    Api { status: u16, body: String },

    #[error("Could not read recipe from response: {0}")]
    MalformedResponse(String),
}

/// A suggested recipe
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratedRecipe {
    pub title: String,
    pub ingredients: Vec<IngredientRequirement>,
    pub instructions: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct RawIngredient {
    name: String,
    #[serde(default, deserialize_with = "number_or_string")]
    quantity: f64,
    #[serde(default)]
    unit: String,
}

#[derive(Debug, Deserialize)]
struct RawRecipe {
    title: String,
    ingredients: Vec<RawIngredient>,
    #[serde(default)]
    instructions: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    text: String,
}

/// Models sometimes quote numbers ("2", "1.5"); anything unreadable becomes 0
fn number_or_string<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(match value {
        serde_json::Value::Number(n) => n.as_f64().unwrap_or(0.0),
        serde_json::Value::String(s) => s.trim().parse().unwrap_or(0.0),
        _ => 0.0,
    })
}

/// Build the prompt sent to the model
pub fn build_prompt(pantry: &[PantryItem], request: Option<&str>) -> String {
    let mut prompt = String::from(
        "Suggest one recipe that can be cooked using only these pantry items \
         (quantities are what is available):\n",
    );

    for item in pantry {
        prompt.push_str(&format!("- {} ({})\n", item.name, item.quantity));
    }

    if let Some(request) = request.map(str::trim).filter(|r| !r.is_empty()) {
        prompt.push_str(&format!("\nThe cook asked for: {}\n", request));
    }

    prompt.push_str(
        "\nUse the pantry item names exactly as written. Reply with JSON only, no prose, \
         in this shape:\n\
         {\"title\": \"...\", \"ingredients\": [{\"name\": \"...\", \"quantity\": 1.0, \"unit\": \"g\"}], \
         \"instructions\": [\"step 1\", \"step 2\"]}\n",
    );

    prompt
}

/// Extract the recipe JSON object from the model's reply
pub fn parse_recipe_response(text: &str) -> Result<GeneratedRecipe, GenerationError> {
    let start = text
        .find('{')
        .ok_or_else(|| GenerationError::MalformedResponse("no JSON object in reply".to_string()))?;
    let end = text
        .rfind('}')
        .filter(|end| *end > start)
        .ok_or_else(|| GenerationError::MalformedResponse("unterminated JSON object".to_string()))?;

    let raw: RawRecipe = serde_json::from_str(&text[start..=end])
        .map_err(|e| GenerationError::MalformedResponse(e.to_string()))?;

    let ingredients = raw
        .ingredients
        .into_iter()
        .filter(|i| !i.name.trim().is_empty())
        .map(|i| IngredientRequirement::new(i.name.trim(), i.quantity.max(0.0), i.unit.trim()))
        .collect();

    Ok(GeneratedRecipe {
        title: raw.title.trim().to_string(),
        ingredients,
        instructions: raw.instructions,
    })
}

/// Client for the text-generation API
#[derive(Clone)]
pub struct RecipeGenerator {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
    model: String,
}

/// First non-blank key; a blank `primary` does not hide `fallback`
fn pick_api_key(primary: Option<String>, fallback: Option<String>) -> Option<String> {
    let usable = |key: &String| !key.trim().is_empty();
    primary.filter(usable).or_else(|| fallback.filter(usable))
}

impl RecipeGenerator {
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: DEFAULT_ENDPOINT.to_string(),
            api_key: api_key.into(),
            model: model.into(),
        }
    }

    /// Configure from `HOMELOG_ANTHROPIC_API_KEY` (or `ANTHROPIC_API_KEY`)
    /// and `HOMELOG_RECIPE_MODEL`
    pub fn from_env() -> Result<Self, GenerationError> {
        let api_key = pick_api_key(
            std::env::var("HOMELOG_ANTHROPIC_API_KEY").ok(),
            std::env::var("ANTHROPIC_API_KEY").ok(),
        )
        .ok_or(GenerationError::MissingApiKey)?;
        let model = std::env::var("HOMELOG_RECIPE_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string());

        Ok(Self::new(api_key, model))
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Ask for a recipe based on the pantry snapshot
    pub async fn suggest(
        &self,
        pantry: &[PantryItem],
        request: Option<&str>,
    ) -> Result<GeneratedRecipe, GenerationError> {
        let body = json!({
            "model": self.model,
            "max_tokens": MAX_TOKENS,
            "messages": [{ "role": "user", "content": build_prompt(pantry, request) }],
        });

        tracing::debug!("Requesting recipe suggestion from {}", self.model);

        let response = self
            .client
            .post(&self.endpoint)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", API_VERSION)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GenerationError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let message: MessagesResponse = response.json().await?;
        let text: String = message
            .content
            .into_iter()
            .filter(|block| block.kind == "text")
            .map(|block| block.text)
            .collect();

        parse_recipe_response(&text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::measure::Quantity;

    fn item(name: &str, amount: f64, unit: &str) -> PantryItem {
        PantryItem {
            id: 1,
            name: name.to_string(),
            quantity: Quantity::new(amount, unit),
            created_at: String::new(),
            updated_at: String::new(),
        }
    }

    #[test]
    fn test_prompt_lists_pantry_and_request() {
        let prompt = build_prompt(
            &[item("flour", 500.0, "g"), item("eggs", 6.0, "")],
            Some("something sweet"),
        );
        assert!(prompt.contains("- flour (500 g)"));
        assert!(prompt.contains("- eggs (6)"));
        assert!(prompt.contains("The cook asked for: something sweet"));
    }

    #[test]
    fn test_prompt_skips_blank_request() {
        let prompt = build_prompt(&[item("rice", 1.0, "kg")], Some("   "));
        assert!(!prompt.contains("asked for"));
    }

    #[test]
    fn test_parse_reply_with_surrounding_text() {
        let reply = r#"Here you go:
        {"title": "Pancakes",
         "ingredients": [
            {"name": "flour", "quantity": 2, "unit": "cups"},
            {"name": "eggs", "quantity": "2"},
            {"name": " ", "quantity": 1, "unit": "g"}
         ],
         "instructions": ["Whisk", "Fry"]}
        Enjoy!"#;

        let recipe = parse_recipe_response(reply).unwrap();
        assert_eq!(recipe.title, "Pancakes");
        assert_eq!(
            recipe.ingredients,
            vec![
                IngredientRequirement::new("flour", 2.0, "cups"),
                IngredientRequirement::new("eggs", 2.0, ""),
            ]
        );
        assert_eq!(recipe.instructions, vec!["Whisk", "Fry"]);
    }

    #[test]
    fn test_parse_reply_without_json() {
        assert!(matches!(
            parse_recipe_response("I cannot help with that."),
            Err(GenerationError::MalformedResponse(_))
        ));
        assert!(matches!(
            parse_recipe_response(r#"{"title": "Soup"}"#),
            Err(GenerationError::MalformedResponse(_))
        ));
    }

    #[test]
    fn test_blank_primary_key_falls_back() {
        let key = pick_api_key(Some("  ".to_string()), Some("sk-fallback".to_string()));
        assert_eq!(key.as_deref(), Some("sk-fallback"));
        assert_eq!(
            pick_api_key(Some("sk-home".to_string()), Some("sk-fallback".to_string())).as_deref(),
            Some("sk-home")
        );
        assert_eq!(pick_api_key(Some(String::new()), None), None);
        assert_eq!(pick_api_key(None, Some("".to_string())), None);
    }
}
