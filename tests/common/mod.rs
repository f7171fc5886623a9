use std::net::SocketAddr;

use reqwest::header::{COOKIE, HeaderMap, SET_COOKIE};
use reqwest::{Client, RequestBuilder, StatusCode};
use serde_json::{Value, json};
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use uuid::Uuid;

use showcase::auth::{password, session};
use showcase::config::{Config, DEFAULT_FEATURED_PROJECTS};
use showcase::db;
use showcase::db::projects::ProjectChanges;
use showcase::db::users::{NewUser, UserChanges};
use showcase::models::{Project, ROLE_ADMIN, ROLE_MEMBER, User};

pub const PASSWORD: &str = "password123";

/// A running test server instance with a dedicated test database.
pub struct TestApp {
    pub addr: SocketAddr,
    pub pool: PgPool,
    pub client: Client,
    pub db_name: String,
}

/// Status, headers and body text of a response.
pub struct Page {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: String,
}

impl Page {
    pub fn location(&self) -> Option<&str> {
        self.headers
            .get(reqwest::header::LOCATION)
            .and_then(|v| v.to_str().ok())
    }

    pub fn set_cookies(&self) -> Vec<String> {
        self.headers
            .get_all(SET_COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .map(str::to_string)
            .collect()
    }

    /// Value of the session cookie set by this response, if any.
    pub fn session_token(&self) -> Option<String> {
        self.set_cookies().iter().find_map(|c| {
            c.split(';')
                .next()
                .and_then(|pair| pair.strip_prefix("session="))
                .filter(|v| !v.is_empty())
                .map(str::to_string)
        })
    }
}

impl TestApp {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    fn with_session(builder: RequestBuilder, token: Option<&str>) -> RequestBuilder {
        match token {
            Some(token) => builder.header(COOKIE, format!("session={token}")),
            None => builder,
        }
    }

    async fn page(builder: RequestBuilder) -> Page {
        let resp = builder.send().await.expect("request failed");
        Page {
            status: resp.status(),
            headers: resp.headers().clone(),
            body: resp.text().await.unwrap_or_default(),
        }
    }

    async fn json(builder: RequestBuilder) -> (Value, StatusCode) {
        let resp = builder.send().await.expect("request failed");
        let status = resp.status();
        let body: Value = resp.json().await.unwrap_or(json!(null));
        (body, status)
    }

    /// GET a page, optionally signed in.
    pub async fn get_page(&self, path: &str, token: Option<&str>) -> Page {
        Self::page(Self::with_session(self.client.get(self.url(path)), token)).await
    }

    pub async fn post_form(&self, path: &str, form: &[(&str, &str)], token: Option<&str>) -> Page {
        Self::page(Self::with_session(self.client.post(self.url(path)), token).form(form)).await
    }

    pub async fn get_json(&self, path: &str, token: Option<&str>) -> (Value, StatusCode) {
        Self::json(Self::with_session(self.client.get(self.url(path)), token)).await
    }

    pub async fn post_json(&self, path: &str, body: &Value, token: Option<&str>) -> (Value, StatusCode) {
        Self::json(Self::with_session(self.client.post(self.url(path)), token).json(body)).await
    }

    pub async fn put_json(&self, path: &str, body: &Value, token: Option<&str>) -> (Value, StatusCode) {
        Self::json(Self::with_session(self.client.put(self.url(path)), token).json(body)).await
    }

    pub async fn delete_json(&self, path: &str, token: Option<&str>) -> (Value, StatusCode) {
        Self::json(Self::with_session(self.client.delete(self.url(path)), token)).await
    }

    /// Login through the JSON API and return the response.
    pub async fn login(&self, email: &str, password: &str) -> Page {
        Self::page(
            self.client
                .post(self.url("/api/v1/auth/login"))
                .json(&json!({ "email": email, "password": password })),
        )
        .await
    }

    /// Insert a member whose email is `<url>@test.com` and password is `PASSWORD`.
    pub async fn seed_user(&self, url: &str, name: &str) -> User {
        self.seed_user_with_role(url, name, ROLE_MEMBER).await
    }

    pub async fn seed_admin(&self, url: &str, name: &str) -> User {
        self.seed_user_with_role(url, name, ROLE_ADMIN).await
    }

    async fn seed_user_with_role(&self, url: &str, name: &str, role: &str) -> User {
        let password_hash = password::hash(PASSWORD).unwrap();
        let email = format!("{url}@test.com");
        db::users::create(
            &self.pool,
            &NewUser {
                url,
                email: &email,
                password_hash: &password_hash,
                name,
                role,
            },
        )
        .await
        .expect("seed user failed")
    }

    pub async fn update_user(&self, user: &User, changes: UserChanges) -> User {
        db::users::update(&self.pool, user.id, changes)
            .await
            .expect("update user failed")
    }

    /// Insert a project with an explicit date so listing order is predictable.
    pub async fn seed_project(
        &self,
        owner: &User,
        url: &str,
        title: &str,
        visible: bool,
        days_ago: i64,
    ) -> Project {
        let project = db::projects::create(&self.pool, owner.id, url, title)
            .await
            .expect("seed project failed");
        db::projects::update(
            &self.pool,
            project.id,
            ProjectChanges {
                visible: Some(visible),
                date: Some(chrono::Utc::now() - chrono::Duration::days(days_ago)),
                ..Default::default()
            },
        )
        .await
        .expect("seed project update failed")
    }

    pub async fn add_author(&self, project: &Project, user: &User, position: &str) {
        sqlx::query("INSERT INTO project_authors (project_id, user_id, position) VALUES ($1, $2, $3)")
            .bind(project.id)
            .bind(user.id)
            .bind(position)
            .execute(&self.pool)
            .await
            .expect("add author failed");
    }

    /// Start a session directly in the database and return its cookie value.
    pub async fn session_for(&self, user: &User) -> String {
        session::start(&self.pool, user.id)
            .await
            .expect("start session failed")
    }
}

fn database_url(base_url: &str, db_name: &str) -> String {
    base_url
        .rsplit_once('/')
        .map(|(base, _)| format!("{base}/{db_name}"))
        .unwrap_or_else(|| base_url.to_string())
}

/// Spawn a test app with a fresh temporary database.
pub async fn spawn_app() -> TestApp {
    let _ = dotenvy::dotenv();

    let base_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set for tests");

    // Create a unique test database
    let db_name = format!("showcase_test_{}", Uuid::now_v7().simple());

    let admin_pool = PgPoolOptions::new()
        .max_connections(2)
        .connect(&database_url(&base_url, "postgres"))
        .await
        .expect("Failed to connect to postgres for test DB creation");

    sqlx::query(&format!("CREATE DATABASE \"{db_name}\""))
        .execute(&admin_pool)
        .await
        .expect("Failed to create test database");

    admin_pool.close().await;

    let test_url = database_url(&base_url, &db_name);
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&test_url)
        .await
        .expect("Failed to connect to test database");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to run migrations on test database");

    let config = Config {
        database_url: test_url,
        host: "127.0.0.1".parse().unwrap(),
        port: 0, // unused, we bind to random port
        trusted_proxies: vec![],
        featured_projects: DEFAULT_FEATURED_PROJECTS
            .split(',')
            .map(str::to_string)
            .collect(),
        secure_cookies: false,
        log_level: "warn".to_string(),
        smtp: None,
    };

    let app = showcase::build_app(showcase::build_state(pool.clone(), config));

    // Bind to random port
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind to random port");
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(
            listener,
            app.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .await
        .expect("Server failed");
    });

    let client = Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .unwrap();

    TestApp {
        addr,
        pool,
        client,
        db_name,
    }
}

/// Drop the test database after tests complete.
pub async fn cleanup(app: TestApp) {
    let db_name = app.db_name.clone();
    app.pool.close().await;

    let base_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set for tests");
    let admin_pool = PgPoolOptions::new()
        .max_connections(2)
        .connect(&database_url(&base_url, "postgres"))
        .await
        .expect("Failed to connect for cleanup");

    let _ = sqlx::query(&format!("DROP DATABASE IF EXISTS \"{db_name}\" WITH (FORCE)"))
        .execute(&admin_pool)
        .await;

    admin_pool.close().await;
}
