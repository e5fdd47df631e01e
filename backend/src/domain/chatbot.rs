//! Conversational financial assistant: session management, the hosted-model
//! pipeline and the rule-based fallback responder.
//!
//! Sessions live in an in-memory store owned by the composition root; the
//! responder consumes a typed [`ChatContext`] built from the data store
//! rather than reaching into shared state.

use std::collections::HashMap;

use thiserror::Error;
use tokio::sync::RwLock;
use tracing::warn;
use uuid::Uuid;

use shared::{ChatMessage, ChatRequest, ChatResponse, ChatRole, ChatSession};

use crate::llm::{ChatTurn, ModelClient};

/// How many prior messages are replayed to the hosted model.
const HISTORY_WINDOW: usize = 10;

#[derive(Debug, Error)]
pub enum ChatError {
    #[error("Session {0} introuvable")]
    SessionNotFound(String),
}

/// Financial context handed to the responder, built per request from the
/// data store.
#[derive(Debug, Clone, Default)]
pub struct ChatContext {
    pub total_balance: Option<f64>,
    pub currency: Option<String>,
    pub account_count: Option<usize>,
    pub recent_transaction_count: Option<usize>,
}

/// In-memory store of chat sessions keyed by generated session id.
#[derive(Default)]
pub struct ChatSessionStore {
    sessions: RwLock<HashMap<String, ChatSession>>,
}

impl ChatSessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new session and return its id.
    pub async fn create_session(&self) -> String {
        let session_id = format!("sess_{}", &Uuid::new_v4().simple().to_string()[..12]);
        let now = chrono::Local::now().to_rfc3339();

        let session = ChatSession {
            session_id: session_id.clone(),
            created_at: now.clone(),
            updated_at: now,
            messages: Vec::new(),
            is_active: true,
        };
        self.sessions
            .write()
            .await
            .insert(session_id.clone(), session);

        session_id
    }

    pub async fn get(&self, session_id: &str) -> Option<ChatSession> {
        self.sessions.read().await.get(session_id).cloned()
    }

    /// Append a message to a session, updating its `updated_at` stamp.
    pub async fn add_message(
        &self,
        session_id: &str,
        role: ChatRole,
        content: &str,
    ) -> Result<ChatMessage, ChatError> {
        let mut sessions = self.sessions.write().await;
        let session = sessions
            .get_mut(session_id)
            .ok_or_else(|| ChatError::SessionNotFound(session_id.to_string()))?;

        let message = ChatMessage {
            id: format!("msg_{}", &Uuid::new_v4().simple().to_string()[..8]),
            session_id: session_id.to_string(),
            role,
            content: content.to_string(),
            timestamp: chrono::Local::now().to_rfc3339(),
        };
        session.messages.push(message.clone());
        session.updated_at = chrono::Local::now().to_rfc3339();

        Ok(message)
    }

    /// Delete a session; returns whether it existed.
    pub async fn remove(&self, session_id: &str) -> bool {
        self.sessions.write().await.remove(session_id).is_some()
    }

    pub async fn active_sessions(&self) -> Vec<ChatSession> {
        self.sessions
            .read()
            .await
            .values()
            .filter(|session| session.is_active)
            .cloned()
            .collect()
    }
}

/// Process one chat message: resolve or create the session, append the user
/// message, generate the assistant reply and compute follow-up suggestions.
pub async fn process_chat_message(
    store: &ChatSessionStore,
    model: &ModelClient,
    request: ChatRequest,
    context: &ChatContext,
) -> Result<ChatResponse, ChatError> {
    let session_id = match &request.session_id {
        Some(id) => {
            if store.get(id).await.is_none() {
                return Err(ChatError::SessionNotFound(id.clone()));
            }
            id.clone()
        }
        None => store.create_session().await,
    };

    store
        .add_message(&session_id, ChatRole::User, &request.message)
        .await?;

    let session = store
        .get(&session_id)
        .await
        .ok_or_else(|| ChatError::SessionNotFound(session_id.clone()))?;
    let reply = generate_response(model, &session, &request.message, context).await;

    let message = store
        .add_message(&session_id, ChatRole::Assistant, &reply)
        .await?;

    let session = store
        .get(&session_id)
        .await
        .ok_or_else(|| ChatError::SessionNotFound(session_id.clone()))?;
    let suggestions = conversation_suggestions(&session);

    Ok(ChatResponse {
        session_id,
        message,
        suggestions,
    })
}

/// Generate the assistant reply: hosted model when configured, rule-based
/// fallback otherwise or on any model error.
async fn generate_response(
    model: &ModelClient,
    session: &ChatSession,
    user_message: &str,
    context: &ChatContext,
) -> String {
    if !model.is_configured() {
        return fallback_response(user_message, context);
    }

    let system = build_system_prompt(context);
    let start = session.messages.len().saturating_sub(HISTORY_WINDOW);
    let turns: Vec<ChatTurn> = session.messages[start..]
        .iter()
        .map(|message| ChatTurn {
            role: role_name(message.role).to_string(),
            content: message.content.clone(),
        })
        .collect();

    match model.chat_complete(&system, &turns).await {
        Ok(reply) => reply,
        Err(err) => {
            warn!("model call failed, using fallback response: {err:#}");
            fallback_response(user_message, context)
        }
    }
}

fn role_name(role: ChatRole) -> &'static str {
    match role {
        ChatRole::User => "user",
        ChatRole::Assistant => "assistant",
        ChatRole::System => "system",
    }
}

fn build_system_prompt(context: &ChatContext) -> String {
    let mut prompt = String::from(
        "Vous êtes un assistant financier IA expert qui aide les utilisateurs \
         à comprendre et gérer leurs finances personnelles.\n\n\
         Vos responsabilités incluent :\n\
         - Analyser les soldes de comptes et les transactions\n\
         - Fournir des insights sur les habitudes de dépenses\n\
         - Générer des rapports financiers clairs\n\
         - Détecter des tendances et anomalies\n\
         - Donner des conseils financiers personnalisés\n\n\
         Répondez toujours en français de manière claire, professionnelle et empathique.",
    );

    let has_context = context.total_balance.is_some()
        || context.recent_transaction_count.is_some()
        || context.account_count.is_some();
    if !has_context {
        return prompt;
    }

    prompt.push_str("\n\nContexte financier actuel :");
    if let Some(total) = context.total_balance {
        let currency = context.currency.as_deref().unwrap_or("EUR");
        prompt.push_str(&format!(
            "\n- Solde total : {} {}",
            format_amount(total),
            currency
        ));
    }
    if let Some(count) = context.recent_transaction_count {
        prompt.push_str(&format!("\n- Nombre de transactions récentes : {count}"));
    }
    if let Some(count) = context.account_count {
        prompt.push_str(&format!("\n- Nombre de comptes : {count}"));
    }

    prompt
}

/// Deterministic keyword-based reply used when the hosted model is
/// unconfigured or unreachable.
fn fallback_response(user_message: &str, context: &ChatContext) -> String {
    let message = user_message.to_lowercase();

    if message.contains("solde") || message.contains("balance") {
        if let Some(total) = context.total_balance {
            let currency = context.currency.as_deref().unwrap_or("EUR");
            return format!(
                "Votre solde total actuel est de {} {}.",
                format_amount(total),
                currency
            );
        }
        return "Pour consulter votre solde, j'ai besoin d'accéder à vos données de compte."
            .to_string();
    }

    if message.contains("transaction") || message.contains("dépense") {
        if let Some(count) = context.recent_transaction_count {
            return format!(
                "Vous avez {count} transactions récentes. Souhaitez-vous voir les détails ?"
            );
        }
        return "Je peux vous aider à analyser vos transactions. Quelle période vous intéresse ?"
            .to_string();
    }

    if message.contains("bonjour") || message.contains("hello") || message.contains("salut") {
        return "Bonjour ! Je suis votre assistant financier. Comment puis-je vous aider aujourd'hui ?"
            .to_string();
    }

    if message.contains("aide") || message.contains("help") {
        return "Je peux vous aider avec :\n\
                - Consulter vos soldes de compte\n\
                - Analyser vos transactions\n\
                - Générer des rapports financiers\n\
                - Détecter des tendances de dépenses\n\
                Que souhaitez-vous faire ?"
            .to_string();
    }

    "Je suis votre assistant financier IA. Je peux vous aider à comprendre vos finances. \
     Posez-moi des questions sur vos soldes, transactions, ou demandez une analyse."
        .to_string()
}

/// Suggested follow-up questions based on the latest message of the
/// conversation (the assistant reply once one has been appended).
fn conversation_suggestions(session: &ChatSession) -> Vec<String> {
    let default = vec![
        "Quel est mon solde total ?".to_string(),
        "Montre-moi mes dernières transactions".to_string(),
        "Génère un rapport mensuel".to_string(),
    ];

    let last_message = match session.messages.last() {
        Some(message) => message.content.to_lowercase(),
        None => return default,
    };

    if last_message.contains("solde") {
        vec![
            "Quelles sont mes dépenses ce mois ?".to_string(),
            "Y a-t-il des alertes sur mes comptes ?".to_string(),
            "Affiche un graphique de l'évolution".to_string(),
        ]
    } else if last_message.contains("transaction") {
        vec![
            "Catégorise ces transactions".to_string(),
            "Quelle est ma plus grosse dépense ?".to_string(),
            "Analyse mes habitudes de dépense".to_string(),
        ]
    } else {
        default
    }
}

// Renders 725000.5 as "725,000.50", matching the display format the
// assistant uses for currency amounts.
fn format_amount(value: f64) -> String {
    let formatted = format!("{:.2}", value.abs());
    let (int_part, frac_part) = formatted
        .split_once('.')
        .unwrap_or((formatted.as_str(), "00"));

    let mut grouped = String::new();
    let digits = int_part.as_bytes();
    for (i, digit) in digits.iter().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(*digit as char);
    }

    let sign = if value < 0.0 { "-" } else { "" };
    format!("{sign}{grouped}.{frac_part}")
}
