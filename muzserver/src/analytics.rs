//! Port d'analytique, strictement fire-and-forget
//!
//! L'enregistrement d'un évènement ne bloque jamais une requête et
//! n'échoue jamais du point de vue de l'appelant : l'envoi se fait dans
//! une tâche détachée et toute erreur est simplement journalisée.

use serde_json::json;

/// Puits d'évènements d'usage
pub trait AnalyticsSink: Send + Sync {
    /// Enregistre un évènement ; ne bloque pas, n'échoue pas
    fn record(&self, query: &str, event: &str);
}

/// Puits inactif (analytique désactivée, tests)
pub struct NullSink;

impl AnalyticsSink for NullSink {
    fn record(&self, _query: &str, _event: &str) {}
}

/// Puits HTTP : POST JSON vers un collecteur externe
pub struct HttpSink {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpSink {
    pub fn new(endpoint: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint,
        }
    }
}

impl AnalyticsSink for HttpSink {
    fn record(&self, query: &str, event: &str) {
        let payload = json!({
            "query": query,
            "event": event,
            "timestamp": chrono::Utc::now().to_rfc3339(),
        });
        let request = self.client.post(&self.endpoint).json(&payload);

        tokio::spawn(async move {
            if let Err(e) = request.send().await {
                tracing::debug!("Analytics event dropped: {}", e);
            }
        });
    }
}
