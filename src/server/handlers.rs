use crate::error::{Error, ErrorType};
use crate::model::{DropdownOptions, NewEntry, Records};
use crate::server::ApiError;
use crate::Ledger;
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub(super) struct Message {
    message: &'static str,
}

#[derive(Debug, Serialize)]
pub(super) struct SheetConnection {
    message: &'static str,
    titre_du_tableau: String,
}

#[derive(Debug, Serialize)]
pub(super) struct EntryAdded {
    message: &'static str,
    id: u64,
}

/// Liveness check.
pub(super) async fn read_root() -> Json<Message> {
    Json(Message {
        message: "Hello, FastAPI!",
    })
}

/// Opens the sheet and returns the title of its first worksheet.
#[axum::debug_handler]
pub(super) async fn test_google_sheets(
    State(ledger): State<Ledger>,
) -> Result<Json<SheetConnection>, ApiError> {
    let title = ledger.sheet_title().await?;
    Ok(Json(SheetConnection {
        message: "Connexion réussie !",
        titre_du_tableau: title,
    }))
}

#[axum::debug_handler]
pub(super) async fn add_entry(
    State(ledger): State<Ledger>,
    entry: Result<Json<NewEntry>, JsonRejection>,
) -> Result<Json<EntryAdded>, ApiError> {
    let Json(entry) = entry.map_err(|rejection| {
        Error::msg(ErrorType::Request, rejection.body_text())
    })?;
    let id = ledger.add_entry(&entry).await?;
    Ok(Json(EntryAdded {
        message: "Entrée ajoutée avec succès !",
        id,
    }))
}

#[axum::debug_handler]
pub(super) async fn get_entries(State(ledger): State<Ledger>) -> Result<Json<Records>, ApiError> {
    Ok(Json(ledger.entries().await?))
}

#[axum::debug_handler]
pub(super) async fn get_dropdown_options(
    State(ledger): State<Ledger>,
) -> Result<Json<DropdownOptions>, ApiError> {
    Ok(Json(ledger.dropdown_options().await?))
}

pub(super) async fn not_found() -> ApiError {
    ApiError::new(StatusCode::NOT_FOUND, "Not Found")
}

#[cfg(test)]
mod tests {
    use crate::api::TestSheetState;
    use crate::error::ErrorType;
    use crate::server::endpoints;
    use crate::test::TestEnv;
    use axum::http::StatusCode;
    use serde_json::{json, Value};
    use std::collections::BTreeSet;

    fn entry_json() -> Value {
        json!({
            "date": "2024-01-01",
            "categorie": "Food",
            "type_transaction": "Expense",
            "amount": 12.5,
            "compte": "Checking",
            "beneficiaire": "Store",
            "frequence": "One-time"
        })
    }

    #[tokio::test]
    async fn read_root_returns_greeting() {
        let env = TestEnv::new().await;
        let server = env.server().await;
        let response = server.get(endpoints::ROOT).await;
        response.assert_status_ok();
        response.assert_json(&json!({"message": "Hello, FastAPI!"}));
    }

    #[tokio::test]
    async fn test_google_sheets_returns_title() {
        let env = TestEnv::new().await;
        let server = env.server().await;
        let response = server.get(endpoints::TEST_GOOGLE_SHEETS).await;
        response.assert_status_ok();
        response.assert_json(&json!({
            "message": "Connexion réussie !",
            "titre_du_tableau": "Sheet1"
        }));
    }

    #[tokio::test]
    async fn add_entry_to_empty_sheet_then_list() {
        let env = TestEnv::new().await;
        let server = env.server().await;

        let response = server.post(endpoints::ADD_ENTRY).json(&entry_json()).await;
        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["id"], json!(1));
        assert_eq!(body["message"], json!("Entrée ajoutée avec succès !"));

        let entries: Value = server.get(endpoints::GET_ENTRIES).await.json();
        assert_eq!(
            entries,
            json!([{
                "id": 1,
                "date": "01-Jan-24",
                "categorie": "Food",
                "type_transaction": "Expense",
                "amount": 12.5,
                "compte": "Checking",
                "beneficiaire": "Store",
                "frequence": "One-time",
                "details": "",
                "fuel_cost": ""
            }])
        );
    }

    #[tokio::test]
    async fn add_entry_twice_assigns_increasing_ids() {
        let env = TestEnv::new().await;
        let server = env.server().await;
        let first: Value = server
            .post(endpoints::ADD_ENTRY)
            .json(&entry_json())
            .await
            .json();
        let second: Value = server
            .post(endpoints::ADD_ENTRY)
            .json(&entry_json())
            .await
            .json();
        assert_eq!(first["id"], json!(1));
        assert_eq!(second["id"], json!(2));
    }

    #[tokio::test]
    async fn add_entry_accepts_form_strings() {
        let env = TestEnv::new().await;
        let server = env.server().await;
        let mut entry = entry_json();
        entry["amount"] = json!("42");
        entry["fuel_cost"] = json!("");
        entry["details"] = json!("from the form");
        server
            .post(endpoints::ADD_ENTRY)
            .json(&entry)
            .await
            .assert_status_ok();

        let rows = env.get_state().rows;
        assert_eq!(rows[1][4], "42");
        assert_eq!(rows[1][8], "from the form");
        assert_eq!(rows[1].len(), 9);
    }

    #[tokio::test]
    async fn add_entry_invalid_body() {
        let env = TestEnv::new().await;
        let server = env.server().await;
        let mut entry = entry_json();
        entry["date"] = json!("not a date");
        let response = server
            .post(endpoints::ADD_ENTRY)
            .json(&entry)
            .expect_failure()
            .await;
        response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
        let body: Value = response.json();
        assert!(!body["detail"].as_str().unwrap().is_empty());
        assert_eq!(env.get_state().rows.len(), 1);
    }

    #[tokio::test]
    async fn add_entry_non_numeric_last_id() {
        let env = TestEnv::new().await;
        let mut state = TestSheetState::header_only();
        state.rows.push(vec!["oops".to_string(), "01-Jan-24".to_string()]);
        env.set_state(state);
        let server = env.server().await;

        let response = server
            .post(endpoints::ADD_ENTRY)
            .json(&entry_json())
            .expect_failure()
            .await;
        response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
        let body: Value = response.json();
        assert!(body["detail"].as_str().unwrap().contains("'oops'"));

        // The server keeps serving.
        server.get(endpoints::ROOT).await.assert_status_ok();
        server.get(endpoints::GET_ENTRIES).await.assert_status_ok();
    }

    #[tokio::test]
    async fn get_dropdown_options_distinct_values() {
        let env = TestEnv::new().await;
        let server = env.server().await;
        for (categorie, compte) in [("Food", "Checking"), ("Fuel", "Checking"), ("Food", "")] {
            let mut entry = entry_json();
            entry["categorie"] = json!(categorie);
            entry["compte"] = json!(compte);
            server
                .post(endpoints::ADD_ENTRY)
                .json(&entry)
                .await
                .assert_status_ok();
        }

        let response = server.get(endpoints::GET_DROPDOWN_OPTIONS).await;
        response.assert_status_ok();
        let body: Value = response.json();
        let set = |key: &str| -> BTreeSet<String> {
            body[key]
                .as_array()
                .unwrap()
                .iter()
                .map(|v| v.as_str().unwrap().to_string())
                .collect()
        };
        assert_eq!(set("categories"), BTreeSet::from(["Food".into(), "Fuel".into()]));
        assert_eq!(set("types_frais"), BTreeSet::from(["Expense".into()]));
        assert_eq!(set("comptes"), BTreeSet::from(["Checking".into()]));
        assert_eq!(set("beneficiaires"), BTreeSet::from(["Store".into()]));
        assert_eq!(set("frequences"), BTreeSet::from(["One-time".into()]));
        assert_eq!(body["categories"].as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn datastore_failure_is_500_except_root() {
        let env = TestEnv::new().await;
        env.set_state(TestSheetState::failing(
            ErrorType::Auth,
            "invalid_grant: Invalid JWT Signature.",
        ));
        let server = env.server().await;

        server.get(endpoints::ROOT).await.assert_status_ok();

        let responses = vec![
            server
                .get(endpoints::TEST_GOOGLE_SHEETS)
                .expect_failure()
                .await,
            server.get(endpoints::GET_ENTRIES).expect_failure().await,
            server
                .get(endpoints::GET_DROPDOWN_OPTIONS)
                .expect_failure()
                .await,
            server
                .post(endpoints::ADD_ENTRY)
                .json(&entry_json())
                .expect_failure()
                .await,
        ];
        for response in responses {
            response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
            let body: Value = response.json();
            assert_eq!(
                body["detail"],
                json!("invalid_grant: Invalid JWT Signature.")
            );
        }
    }

    #[tokio::test]
    async fn unknown_path_is_404() {
        let env = TestEnv::new().await;
        let server = env.server().await;
        let response = server.get("/nope").expect_failure().await;
        response.assert_status_not_found();
        response.assert_json(&json!({"detail": "Not Found"}));
    }

    #[tokio::test]
    async fn cors_allows_any_origin_by_default() {
        let env = TestEnv::new().await;
        let server = env.server().await;
        let response = server
            .get(endpoints::ROOT)
            .add_header("origin", "http://localhost:5173")
            .await;
        response.assert_status_ok();
        assert_eq!(
            response.header("access-control-allow-origin"),
            "*"
        );
    }
}
