//! Document HTTP handlers.

use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;

use crate::{
    AppState, Error,
    document::repository::{DocumentInfo, DocumentRepository, DocumentSummary},
    session::{SessionController, SessionInfo, lock_session},
};

/// The state needed for the document handlers.
#[derive(Debug, Clone)]
pub struct DocumentState {
    /// The open document.
    pub session: Arc<Mutex<SessionController>>,
    /// The saved documents.
    pub repository: DocumentRepository,
}

impl FromRef<AppState> for DocumentState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            session: state.session.clone(),
            repository: state.repository.clone(),
        }
    }
}

/// The request body for creating a document.
#[derive(Debug, Deserialize)]
pub struct NewDocumentForm {
    /// The document name, blank names use the default name.
    #[serde(default)]
    pub name: String,
}

/// List the saved documents ordered by name.
pub async fn list_documents(
    State(state): State<DocumentState>,
) -> Result<Json<Vec<DocumentSummary>>, Error> {
    let mut documents = state.repository.list()?;
    documents.sort_by(|a, b| a.name.cmp(&b.name));

    Ok(Json(documents))
}

/// Open a new, empty document, discarding the transactions of the open one.
pub async fn create_document(
    State(state): State<DocumentState>,
    Json(form): Json<NewDocumentForm>,
) -> Result<impl IntoResponse, Error> {
    let mut session = lock_session(&state.session)?;
    session.open_new(&form.name)?;

    Ok((StatusCode::CREATED, Json(session.info())))
}

/// Get the size and metadata of a saved document.
pub async fn get_document_info(
    State(state): State<DocumentState>,
    Path(name): Path<String>,
) -> Result<Json<DocumentInfo>, Error> {
    state.repository.info(&name).map(Json)
}

/// Replace the open document with the saved document `name`.
pub async fn open_document(
    State(state): State<DocumentState>,
    Path(name): Path<String>,
) -> Result<Json<SessionInfo>, Error> {
    let mut session = lock_session(&state.session)?;
    session.open_existing(&name)?;

    Ok(Json(session.info()))
}

/// Delete a saved document. Deleting a missing document is not an error.
///
/// The open document is not affected, even if it has the same name.
pub async fn delete_document(
    State(state): State<DocumentState>,
    Path(name): Path<String>,
) -> Result<StatusCode, Error> {
    state.repository.delete(&name)?;

    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use axum::{
        Json,
        extract::{Path, State},
        http::StatusCode,
        response::IntoResponse,
    };
    use rusqlite::Connection;
    use time::macros::date;

    use crate::{
        Error,
        db::initialize,
        document::handlers::{
            DocumentState, NewDocumentForm, create_document, delete_document, get_document_info,
            list_documents, open_document,
        },
        document::repository::DocumentRepository,
        session::{SessionController, SessionState},
        storage::LocalStorage,
        transaction::{Transaction, TransactionType},
    };

    fn get_test_state() -> DocumentState {
        let conn = Connection::open_in_memory().unwrap();
        initialize(&conn).unwrap();
        let storage = LocalStorage::new(Arc::new(Mutex::new(conn)));
        let repository = DocumentRepository::new(storage.clone());
        let session = SessionController::new(repository.clone(), storage);

        DocumentState {
            session: Arc::new(Mutex::new(session)),
            repository,
        }
    }

    fn add_expense(state: &DocumentState, amount: f64) {
        state
            .session
            .lock()
            .unwrap()
            .add_transaction(Transaction::build(
                TransactionType::Expense,
                amount,
                "Groceries",
                date!(2025 - 01 - 10),
            ))
            .unwrap();
    }

    #[tokio::test]
    async fn create_document_opens_an_empty_document() {
        let state = get_test_state();

        let response = create_document(
            State(state.clone()),
            Json(NewDocumentForm {
                name: "Budget 2025".to_owned(),
            }),
        )
        .await
        .unwrap()
        .into_response();

        assert_eq!(response.status(), StatusCode::CREATED);
        let session = state.session.lock().unwrap();
        assert_eq!(session.state(), SessionState::Open);
        assert_eq!(session.current_file(), Some("Budget 2025"));
    }

    #[tokio::test]
    async fn list_documents_is_sorted_by_name() {
        let state = get_test_state();
        for name in ["b", "a", "c"] {
            state.session.lock().unwrap().open_new(name).unwrap();
            add_expense(&state, 1.0);
        }

        let Json(documents) = list_documents(State(state)).await.unwrap();

        let names: Vec<&str> = documents.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["a", "b", "c"]);
    }

    #[tokio::test]
    async fn open_document_replaces_the_session() {
        let state = get_test_state();
        state.session.lock().unwrap().open_new("first").unwrap();
        add_expense(&state, 5.0);
        state.session.lock().unwrap().open_new("second").unwrap();

        let Json(info) = open_document(State(state.clone()), Path("first".to_owned()))
            .await
            .unwrap();

        assert_eq!(info.current_file.as_deref(), Some("first"));
        assert_eq!(info.transaction_count, 1);
    }

    #[tokio::test]
    async fn open_missing_document_is_not_found() {
        let state = get_test_state();

        let result = open_document(State(state), Path("missing".to_owned())).await;

        assert_eq!(
            result.unwrap_err(),
            Error::DocumentNotFound("missing".to_owned())
        );
    }

    #[tokio::test]
    async fn get_document_info_reports_metadata() {
        let state = get_test_state();
        state.session.lock().unwrap().open_new("ledger").unwrap();
        add_expense(&state, 5.0);
        add_expense(&state, 6.0);

        let Json(info) = get_document_info(State(state), Path("ledger".to_owned()))
            .await
            .unwrap();

        assert_eq!(info.name, "ledger");
        assert_eq!(info.metadata.transaction_count, 2);
    }

    #[tokio::test]
    async fn delete_document_returns_no_content() {
        let state = get_test_state();
        state.session.lock().unwrap().open_new("ledger").unwrap();
        add_expense(&state, 5.0);

        let status = delete_document(State(state.clone()), Path("ledger".to_owned()))
            .await
            .unwrap();
        let missing = delete_document(State(state.clone()), Path("ledger".to_owned()))
            .await
            .unwrap();

        assert_eq!(status, StatusCode::NO_CONTENT);
        assert_eq!(missing, StatusCode::NO_CONTENT);
        assert_eq!(
            state.repository.info("ledger"),
            Err(Error::DocumentNotFound("ledger".to_owned()))
        );
    }
}
