//! Rule-module administration (bearer-token authenticated).

use reqwest::Method;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info};

use irriga_core::ApiResult;

use crate::client::AgentsClient;
use crate::response::{ensure_success, read_json};

const MODULES_PATH: &str = "/agents/prolog/modules";
const SAVE_FALLBACK: &str = "Validação falhou";

/// Main knowledge base file.
pub const KNOWLEDGE_BASE: &str = "knowledge_base.pl";

#[derive(Deserialize)]
struct ModuleList {
    modules: Vec<String>,
}

#[derive(Deserialize)]
struct ModuleContent {
    content: String,
}

#[derive(Serialize)]
struct SaveRequest<'a> {
    content: &'a str,
}

/// Result of a successful save; the server validated the module.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaveReport {
    pub message: Option<String>,
}

impl AgentsClient {
    /// Paths of every rule module, relative to the rule base root.
    pub async fn list_modules(&self, token: &str) -> ApiResult<Vec<String>> {
        let builder = self.request(Method::GET, self.url(MODULES_PATH), Some(token));
        let response = ensure_success(self.send(builder).await?, MODULES_PATH, None).await?;
        let list: ModuleList = read_json(response, "Lista de módulos").await?;

        debug!(count = list.modules.len(), "Listed rule modules");
        Ok(list.modules)
    }

    /// Source of one rule module.
    pub async fn get_module(&self, token: &str, path: &str) -> ApiResult<String> {
        let url = self.url_with_segments(MODULES_PATH, path)?;
        let builder = self.request(Method::GET, url, Some(token));
        let response = ensure_success(self.send(builder).await?, MODULES_PATH, None).await?;
        let module: ModuleContent = read_json(response, "Módulo").await?;
        Ok(module.content)
    }

    /// Replace a rule module. The server validates it before accepting;
    /// a rejection carries the server message.
    pub async fn save_module(&self, token: &str, path: &str, content: &str) -> ApiResult<SaveReport> {
        let url = self.url_with_segments(MODULES_PATH, path)?;
        let builder = self
            .request(Method::POST, url, Some(token))
            .json(&SaveRequest { content });
        let response = ensure_success(self.send(builder).await?, MODULES_PATH, Some(SAVE_FALLBACK)).await?;

        // Any JSON body is accepted; only a `message` field is kept.
        let message = response
            .json::<Value>()
            .await
            .ok()
            .and_then(|v| v.get("message").and_then(Value::as_str).map(str::to_string));

        info!(module = %path, "Rule module saved");
        Ok(SaveReport { message })
    }
}

/// Friendly name for a module path.
pub fn module_display_name(path: &str) -> String {
    if path == KNOWLEDGE_BASE {
        return "Base de Conhecimento Principal".to_string();
    }

    let file = path.rsplit('/').next().unwrap_or(path);
    let stem = file.strip_suffix(".pl").unwrap_or(file);

    match stem {
        "corn" => "Milho",
        "tomato" => "Tomate",
        "wheat" => "Trigo",
        "lettuce" => "Alface",
        "cannabis" => "Cannabis",
        other => other,
    }
    .to_string()
}
