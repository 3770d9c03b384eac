use crate::errors::AppError;
use crate::models::{
    CreateRecordRequest, CreateRecordResponse, DeleteRequest, DeleteResponse, IndexedRecord,
    LoginRequest, MetricsResponse, NewRecord, PlanType, PublicRow, RangeQuery, SessionResponse,
    TypeSeries, TypeTotal,
};
use crate::session::{session_cookie, Session};
use crate::state::AppState;
use crate::stats::{aggregate, filter_by_range, metrics, totals_by_type, SumField};
use crate::ui::{render_admin, render_public};
use axum::{
    extract::{Query, State},
    http::{header, HeaderMap, HeaderName, StatusCode},
    response::Html,
    Json,
};
use chrono::Local;
use std::collections::BTreeSet;
use tracing::{error, info, warn};

pub async fn index() -> Html<String> {
    Html(render_public())
}

pub async fn admin_page() -> Html<String> {
    Html(render_admin())
}

pub async fn public_records(State(state): State<AppState>) -> Json<Vec<PublicRow>> {
    let records = state.store.load().await;
    Json(records.iter().map(PublicRow::from).collect())
}

pub async fn public_series(
    State(state): State<AppState>,
    Query(params): Query<Vec<(String, String)>>,
) -> Json<Vec<TypeSeries>> {
    let records = state.store.load().await;
    let selection = parse_selection(&params);
    Json(aggregate(&records, SumField::UnitsMade, &selection))
}

pub async fn public_totals(State(state): State<AppState>) -> Json<Vec<TypeTotal>> {
    let records = state.store.load().await;
    Json(totals_by_type(&records))
}

pub async fn login(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<LoginRequest>,
) -> Result<([(HeaderName, String); 1], Json<SessionResponse>), AppError> {
    if !state.gate.authenticate(&payload.password) {
        warn!("admin login rejected");
        return Err(AppError::unauthorized("incorrect password"));
    }

    let id = state.sessions.grant_admin(&headers).await;
    info!("admin login accepted");
    Ok((
        [(header::SET_COOKIE, session_cookie(&id))],
        Json(SessionResponse {
            authenticated: true,
        }),
    ))
}

pub async fn session_status(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Json<SessionResponse> {
    let session = state.sessions.resolve(&headers).await;
    Json(SessionResponse {
        authenticated: session.is_admin,
    })
}

pub async fn admin_records(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(range): Query<RangeQuery>,
) -> Result<Json<Vec<IndexedRecord>>, AppError> {
    require_admin(&state, &headers).await?;

    let records = state.store.load().await;
    let rows = filter_by_range(&records, range.from, range.to)
        .into_iter()
        .map(|(index, record)| IndexedRecord {
            index,
            record: record.clone(),
        })
        .collect();
    Ok(Json(rows))
}

pub async fn create_record(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<CreateRecordRequest>,
) -> Result<(StatusCode, Json<CreateRecordResponse>), AppError> {
    require_admin(&state, &headers).await?;

    let entry = NewRecord {
        date: payload.date.unwrap_or_else(|| Local::now().date_naive()),
        periodicity: payload.periodicity,
        plan_type: payload.plan_type,
        units_made: payload.units_made,
        unit_price: payload.unit_price,
        unit_cost: payload.unit_cost,
    };

    let record = state.store.append(&entry).await.inspect_err(|err| {
        if err.is_user_error() {
            warn!("record rejected: {err}");
        } else {
            error!("failed to store record: {err}");
        }
    })?;

    let mut warnings = Vec::new();
    if entry.cost_exceeds_price() {
        warn!(plan_type = %record.plan_type, "stored record costs more than it sells for");
        warnings.push("cost is higher than sale price".to_string());
    }

    Ok((
        StatusCode::CREATED,
        Json(CreateRecordResponse { record, warnings }),
    ))
}

pub async fn delete_records(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<DeleteRequest>,
) -> Result<Json<DeleteResponse>, AppError> {
    require_admin(&state, &headers).await?;

    let indices: BTreeSet<usize> = payload.indices.into_iter().collect();
    let removed = state.store.delete(&indices).await.inspect_err(|err| {
        if !err.is_user_error() {
            error!("failed to delete records: {err}");
        }
    })?;
    let remaining = state.store.load().await.len();
    Ok(Json(DeleteResponse { removed, remaining }))
}

pub async fn admin_metrics(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(range): Query<RangeQuery>,
) -> Result<Json<MetricsResponse>, AppError> {
    require_admin(&state, &headers).await?;

    let records = state.store.load().await;
    let selected: Vec<_> = filter_by_range(&records, range.from, range.to)
        .into_iter()
        .map(|(_, record)| record)
        .collect();

    Ok(Json(MetricsResponse {
        metrics: metrics(selected.iter().copied()),
        totals: totals_by_type(selected.iter().copied()),
        profit_series: aggregate(selected.iter().copied(), SumField::NetProfit, &[]),
    }))
}

async fn require_admin(state: &AppState, headers: &HeaderMap) -> Result<Session, AppError> {
    let session = state.sessions.resolve(headers).await;
    if session.is_admin {
        Ok(session)
    } else {
        Err(AppError::unauthorized("admin login required"))
    }
}

/// One plan type per `types` parameter; labels may contain commas.
fn parse_selection(params: &[(String, String)]) -> Vec<PlanType> {
    params
        .iter()
        .filter(|(key, _)| key == "types")
        .map(|(_, label)| label.trim())
        .filter(|label| !label.is_empty())
        .map(PlanType::from_label)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect()
    }

    #[test]
    fn selection_takes_each_types_parameter_whole() {
        assert_eq!(
            parse_selection(&params(&[
                ("types", "Robo"),
                ("types", "Plano, grande"),
                ("types", " "),
                ("other", "Otro"),
            ])),
            vec![
                PlanType::Theft,
                PlanType::Custom("Plano, grande".to_string())
            ]
        );
        assert!(parse_selection(&[]).is_empty());
    }
}
