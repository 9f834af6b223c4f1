use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, post, put},
    Router,
};
use tower_http::{compression::CompressionLayer, cors::CorsLayer, trace::TraceLayer};

use crate::auth::auth_middleware;
use crate::config::PagesBackend;
use crate::handlers::{
    auth as auth_handlers, menus as menu_handlers, pages as page_handlers,
    public as public_handlers, settings as settings_handlers, upload as upload_handlers,
    widgets as widget_handlers,
};
use crate::media::MediaStore;
use crate::sanitize::HtmlSanitizer;
use crate::service::Handbook;
use crate::store::{JsonFileStore, PageStore, SqlPageStore};
use crate::{Config, DbPool};

/// Multipart framing on top of the file itself.
const MULTIPART_OVERHEAD: usize = 64 * 1024;

#[derive(Clone)]
pub struct AppState {
    pub db: DbPool,
    pub config: Config,
    pub handbook: Arc<Handbook>,
    pub media: Arc<MediaStore>,
    pub sanitizer: Arc<HtmlSanitizer>,
}

impl AppState {
    pub fn new(db: DbPool, config: Config) -> Self {
        let store: PageStore = match config.pages_backend {
            PagesBackend::Json => JsonFileStore::new(&config.pages_file).into(),
            PagesBackend::Sql => SqlPageStore::new(db.clone()).into(),
        };
        let media = MediaStore::new(&config.uploads_dir, config.max_upload_bytes);

        Self {
            db,
            handbook: Arc::new(Handbook::new(store)),
            media: Arc::new(media),
            sanitizer: Arc::new(HtmlSanitizer::new()),
            config,
        }
    }
}

pub fn create_router(state: AppState) -> Router {
    let upload_limit = state.config.max_upload_bytes + MULTIPART_OVERHEAD;

    // Public site API
    let public_routes = Router::new()
        .route("/sidebar", get(public_handlers::get_sidebar))
        .route("/pages/:slug", get(public_handlers::get_page));

    // Admin auth routes that need no session
    let admin_auth_routes = Router::new()
        .route("/login", post(auth_handlers::login))
        .route("/register", post(auth_handlers::register));

    let page_routes = Router::new()
        .route(
            "/",
            get(page_handlers::list_pages).post(page_handlers::create_page),
        )
        .route(
            "/:id",
            get(page_handlers::get_page)
                .put(page_handlers::update_page)
                .delete(page_handlers::delete_page),
        )
        .route("/:id/visibility", put(page_handlers::set_visibility))
        .route("/:id/design", put(page_handlers::set_design));

    let menu_routes = Router::new()
        .route(
            "/",
            get(menu_handlers::list_menus).post(menu_handlers::create_menu),
        )
        .route(
            "/:name",
            get(menu_handlers::get_menu)
                .put(menu_handlers::update_menu)
                .delete(menu_handlers::delete_menu),
        );

    let widget_routes = Router::new()
        .route(
            "/",
            get(widget_handlers::list_widgets).post(widget_handlers::create_widget),
        )
        .route(
            "/:name",
            get(widget_handlers::get_widget)
                .put(widget_handlers::update_widget)
                .delete(widget_handlers::delete_widget),
        );

    // Protected admin routes
    let protected_routes = Router::new()
        .route("/logout", post(auth_handlers::logout))
        .route("/me", get(auth_handlers::me))
        .nest("/pages", page_routes)
        .route("/sidebar/reorder", put(page_handlers::reorder_sidebar))
        .nest("/menus", menu_routes)
        .nest("/widgets", widget_routes)
        .route(
            "/settings",
            get(settings_handlers::get_settings).put(settings_handlers::update_settings),
        )
        .route(
            "/upload",
            post(upload_handlers::upload_file).layer(DefaultBodyLimit::max(upload_limit)),
        )
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    let admin_routes = Router::new()
        .merge(admin_auth_routes)
        .merge(protected_routes);

    Router::new()
        .route("/health", get(health_check))
        .nest("/api", public_routes)
        .nest("/api/admin", admin_routes)
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn health_check() -> &'static str {
    "OK"
}
