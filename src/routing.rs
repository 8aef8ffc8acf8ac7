//! Application router configuration.

use axum::{
    Router,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get, post, put},
};

use crate::{
    AppState,
    document::{create_document, delete_document, get_document_info, list_documents, open_document},
    endpoints,
    not_found::get_404_not_found,
    session::{get_session, rename_session, rename_session_input, save_session},
    summary::{
        get_category_summary, get_monthly_summary, get_recent_transactions, get_summary,
        get_top_expenses,
    },
    transaction::{
        clear_transactions_endpoint, create_transaction_endpoint, delete_transaction_endpoint,
        get_transactions_endpoint, quick_add_endpoint,
    },
};

/// Return a router with all the app's routes.
pub fn build_router(state: AppState) -> Router {
    let session_routes = Router::new()
        .route(endpoints::SESSION, get(get_session))
        .route(endpoints::SAVE_SESSION, post(save_session))
        .route(endpoints::SESSION_NAME, put(rename_session))
        .route(endpoints::SESSION_NAME_INPUT, put(rename_session_input));

    let transaction_routes = Router::new()
        .route(
            endpoints::TRANSACTIONS,
            get(get_transactions_endpoint)
                .post(create_transaction_endpoint)
                .delete(clear_transactions_endpoint),
        )
        .route(endpoints::QUICK_ADD_TRANSACTION, post(quick_add_endpoint))
        .route(
            endpoints::DELETE_TRANSACTION,
            delete(delete_transaction_endpoint),
        )
        .route(endpoints::RECENT_TRANSACTIONS, get(get_recent_transactions))
        .route(endpoints::TOP_EXPENSES, get(get_top_expenses));

    let summary_routes = Router::new()
        .route(endpoints::SUMMARY, get(get_summary))
        .route(endpoints::MONTHLY_SUMMARY, get(get_monthly_summary))
        .route(endpoints::CATEGORY_SUMMARY, get(get_category_summary));

    let document_routes = Router::new()
        .route(
            endpoints::DOCUMENTS,
            get(list_documents).post(create_document),
        )
        .route(
            endpoints::DOCUMENT,
            get(get_document_info).delete(delete_document),
        )
        .route(endpoints::OPEN_DOCUMENT, post(open_document));

    Router::new()
        .route(endpoints::COFFEE, get(get_coffee))
        .merge(session_routes)
        .merge(transaction_routes)
        .merge(summary_routes)
        .merge(document_routes)
        .fallback(get_404_not_found)
        .with_state(state)
}

/// Attempt to get a cup of coffee from the server.
async fn get_coffee() -> Response {
    (StatusCode::IM_A_TEAPOT, "I'm a teapot").into_response()
}
