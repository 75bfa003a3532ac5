use crate::{
    application::services::{BindingView, EditorSnapshot},
    domain::entities::{Template as ReportTemplate, VariableKind},
    infrastructure::http::controllers::auth::{attempt_login, cleared_cookie, session_cookie},
    infrastructure::http::middleware::{is_authenticated, ApiError, AppState},
};
use askama::Template;
use axum::{
    extract::{Path, Query, State},
    http::{header, HeaderMap, StatusCode},
    response::{Html, IntoResponse, Redirect, Response},
    Form,
};
use serde::Deserialize;

// Template structs
#[derive(Template)]
#[template(path = "login.html")]
struct LoginTemplate {}

#[derive(Template)]
#[template(path = "dashboard.html")]
struct DashboardTemplate {
    catalog: CatalogPartial,
    editor: Option<EditorView>,
}

#[derive(Template)]
#[template(path = "template_new.html")]
struct TemplateNewTemplate {}

#[derive(Template)]
#[template(path = "partials/template_list.html")]
struct CatalogPartial {
    templates: Vec<CatalogEntry>,
    query: String,
    total: usize,
}

#[derive(Template)]
#[template(path = "partials/editor_output.html")]
struct EditorOutputPartial {
    session_id: String,
    output: String,
}

#[derive(Template)]
#[template(path = "partials/error.html")]
struct ErrorPartial {
    message: String,
}

// View models
struct CatalogEntry {
    id: String,
    name: String,
    preview: String,
    selected: bool,
}

impl CatalogEntry {
    fn from_template(template: &ReportTemplate, selected_id: Option<&str>) -> Self {
        Self {
            id: template.id.clone(),
            name: template.name.clone(),
            preview: template.preview(),
            selected: selected_id == Some(template.id.as_str()),
        }
    }
}

struct VariableControl {
    index: usize,
    name: String,
    is_select: bool,
    options: Vec<String>,
    hint: String,
    value: String,
}

impl From<BindingView> for VariableControl {
    fn from(view: BindingView) -> Self {
        Self {
            index: view.index,
            name: view.name,
            is_select: view.kind == VariableKind::SingleSelect,
            options: view.options,
            hint: view.hint,
            value: view.value,
        }
    }
}

struct EditorView {
    session_id: String,
    template_name: String,
    controls: Vec<VariableControl>,
    output: EditorOutputPartial,
}

impl EditorView {
    fn new(template_name: String, snapshot: EditorSnapshot) -> Self {
        Self {
            output: EditorOutputPartial {
                session_id: snapshot.session_id.clone(),
                output: snapshot.output,
            },
            session_id: snapshot.session_id,
            template_name,
            controls: snapshot.bindings.into_iter().map(Into::into).collect(),
        }
    }
}

// Form data
#[derive(Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    password: String,
}

#[derive(Deserialize)]
pub struct SearchParams {
    q: Option<String>,
}

#[derive(Deserialize)]
pub struct OpenEditorParams {
    previous: Option<String>,
}

#[derive(Deserialize)]
pub struct BindingForm {
    #[serde(default)]
    value: String,
}

#[derive(Deserialize)]
pub struct DirectEditForm {
    #[serde(default)]
    text: String,
}

// Handlers
pub async fn root_redirect(State(state): State<AppState>, headers: HeaderMap) -> Redirect {
    if is_authenticated(&state, &headers) {
        Redirect::to("/dashboard")
    } else {
        Redirect::to("/login")
    }
}

pub async fn show_login_page(State(state): State<AppState>, headers: HeaderMap) -> Response {
    if is_authenticated(&state, &headers) {
        return Redirect::to("/dashboard").into_response();
    }
    HtmlTemplate(LoginTemplate {}).into_response()
}

pub async fn handle_login(
    State(state): State<AppState>,
    headers: HeaderMap,
    Form(form): Form<LoginForm>,
) -> Response {
    match attempt_login(&state, &headers, &form.password).await {
        Ok(issued) => (
            StatusCode::OK,
            [
                (header::SET_COOKIE.as_str(), session_cookie(&issued)),
                ("HX-Redirect", "/dashboard".to_string()),
            ],
        )
            .into_response(),
        Err(ApiError::Unauthorized) => HtmlTemplate(ErrorPartial {
            message: "Invalid password".to_string(),
        })
        .into_response(),
        Err(e) => HtmlTemplate(ErrorPartial {
            message: e.message(),
        })
        .into_response(),
    }
}

pub async fn handle_logout(headers: HeaderMap) -> Response {
    tracing::info!("Operator logged out");

    if headers.contains_key("HX-Request") {
        (
            StatusCode::OK,
            [
                (header::SET_COOKIE.as_str(), cleared_cookie()),
                ("HX-Redirect", "/login".to_string()),
            ],
        )
            .into_response()
    } else {
        (
            [(header::SET_COOKIE, cleared_cookie())],
            Redirect::to("/login"),
        )
            .into_response()
    }
}

pub async fn show_dashboard(State(state): State<AppState>) -> Response {
    match load_catalog(&state, None, None).await {
        Ok(catalog) => HtmlTemplate(DashboardTemplate {
            catalog,
            editor: None,
        })
        .into_response(),
        Err(e) => error_page(e),
    }
}

/// Select a template: fresh bindings, replacing the previous editor session.
pub async fn show_template_editor(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(params): Query<OpenEditorParams>,
) -> Response {
    let template = match state.template_service.get_template(&id).await {
        Ok(template) => template,
        Err(ApiError::NotFound(_)) => return Redirect::to("/dashboard").into_response(),
        Err(e) => return error_page(e),
    };

    let previous = params.previous.as_deref().filter(|p| !p.is_empty());
    let snapshot = match state.editor_service.open(&template.id, previous).await {
        Ok(snapshot) => snapshot,
        Err(e) => return error_page(e),
    };

    match load_catalog(&state, None, Some(&template.id)).await {
        Ok(catalog) => HtmlTemplate(DashboardTemplate {
            catalog,
            editor: Some(EditorView::new(template.name, snapshot)),
        })
        .into_response(),
        Err(e) => error_page(e),
    }
}

pub async fn search_templates(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Response {
    match load_catalog(&state, params.q.as_deref(), None).await {
        Ok(catalog) => HtmlTemplate(catalog).into_response(),
        Err(e) => HtmlTemplate(ErrorPartial {
            message: e.message(),
        })
        .into_response(),
    }
}

pub async fn delete_template(
    State(state): State<AppState>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Response {
    match state.template_service.delete_template(&id).await {
        Ok(()) => {
            // The open editor showed the deleted template; go back to the empty state.
            let viewing_deleted = headers
                .get("HX-Current-URL")
                .and_then(|v| v.to_str().ok())
                .map(|url| url.contains(&format!("/dashboard/templates/{}", id)))
                .unwrap_or(false);

            if viewing_deleted {
                ([("HX-Redirect", "/dashboard")], Html("")).into_response()
            } else {
                Html("").into_response()
            }
        }
        Err(e) => (
            e.status(),
            HtmlTemplate(ErrorPartial {
                message: e.message(),
            }),
        )
            .into_response(),
    }
}

pub async fn change_binding(
    State(state): State<AppState>,
    Path((session_id, index)): Path<(String, usize)>,
    Form(form): Form<BindingForm>,
) -> Response {
    match state
        .editor_service
        .change_binding(&session_id, index, form.value)
        .await
    {
        Ok(snapshot) => HtmlTemplate(EditorOutputPartial {
            session_id: snapshot.session_id,
            output: snapshot.output,
        })
        .into_response(),
        Err(e) => (
            e.status(),
            HtmlTemplate(ErrorPartial {
                message: e.message(),
            }),
        )
            .into_response(),
    }
}

pub async fn direct_edit(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    Form(form): Form<DirectEditForm>,
) -> Response {
    match state.editor_service.direct_edit(&session_id, form.text).await {
        Ok(_) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => e.into_response(),
    }
}

pub async fn show_create_template_page() -> impl IntoResponse {
    HtmlTemplate(TemplateNewTemplate {})
}

async fn load_catalog(
    state: &AppState,
    query: Option<&str>,
    selected_id: Option<&str>,
) -> Result<CatalogPartial, ApiError> {
    let all = state.template_service.list_templates(None).await?;
    let query = query.map(str::trim).unwrap_or_default().to_string();

    let templates = all
        .iter()
        .filter(|t| query.is_empty() || t.matches_query(&query))
        .map(|t| CatalogEntry::from_template(t, selected_id))
        .collect();

    Ok(CatalogPartial {
        templates,
        query,
        total: all.len(),
    })
}

fn error_page(error: ApiError) -> Response {
    (
        error.status(),
        HtmlTemplate(ErrorPartial {
            message: error.message(),
        }),
    )
        .into_response()
}

// Helper to render Askama templates
struct HtmlTemplate<T>(T);

impl<T> IntoResponse for HtmlTemplate<T>
where
    T: Template,
{
    fn into_response(self) -> Response {
        match self.0.render() {
            Ok(html) => Html(html).into_response(),
            Err(err) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Failed to render template: {}", err),
            )
                .into_response(),
        }
    }
}
