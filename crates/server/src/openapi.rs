use utoipa::OpenApi;
use utoipa::ToSchema;

#[derive(ToSchema)]
pub struct HealthResponse {
    pub ok: bool,
}

#[derive(ToSchema)]
pub struct RegisterRequest {
    pub username: String,
    pub name: String,
    pub email: String,
    pub password: String,
}

#[derive(ToSchema)]
pub struct LoginRequest {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: String,
}

#[derive(ToSchema)]
pub struct CreateCategoryRequest {
    pub name: String,
}

#[derive(ToSchema)]
pub struct CreateUmkmRequest {
    pub name: String,
    pub location: String,
    pub description: Option<String>,
    pub categories: i32,
    pub photo: Option<String>,
}

#[derive(ToSchema)]
pub struct CreateCommentRequest {
    pub content: String,
    pub rating: f64,
}

#[derive(ToSchema)]
pub struct UpdateRoleRequest {
    pub role: String,
}

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::routes::health,
        crate::routes::auth::register,
        crate::routes::auth::login,
        crate::routes::categories::list,
        crate::routes::categories::create,
        crate::routes::umkm::list,
        crate::routes::umkm::detail,
        crate::routes::umkm::create,
        crate::routes::umkm::pending,
        crate::routes::umkm::activate,
        crate::routes::comments::list,
        crate::routes::comments::create,
        crate::routes::admin::update_role,
        crate::routes::users::upload_photo,
    ),
    components(
        schemas(
            HealthResponse,
            RegisterRequest,
            LoginRequest,
            CreateCategoryRequest,
            CreateUmkmRequest,
            CreateCommentRequest,
            UpdateRoleRequest,
        )
    ),
    tags(
        (name = "health"),
        (name = "auth"),
        (name = "categories"),
        (name = "umkm"),
        (name = "comments"),
        (name = "admin"),
        (name = "users")
    )
)]
pub struct ApiDoc;
