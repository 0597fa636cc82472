use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

use crate::config::ServerConfig;
use crate::handlers;
use crate::state::AppState;

pub fn routes(config: &ServerConfig) -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(handlers::health::health))
        .merge(file_routes(config.max_upload_size))
        .merge(album_routes())
        .merge(moment_routes())
        .merge(place_routes())
        .merge(wish_routes())
        .merge(anniversary_routes())
        .merge(user_routes())
        .merge(system_routes())
}

fn file_routes(max_upload_size: u64) -> OpenApiRouter<AppState> {
    let upload = OpenApiRouter::new()
        .routes(routes!(handlers::file::upload_file))
        .layer(handlers::file::upload_body_limit(max_upload_size));

    OpenApiRouter::new()
        .routes(routes!(
            handlers::file::download_file,
            handlers::file::delete_file
        ))
        .routes(routes!(handlers::file::list_unused_files))
        .merge(upload)
}

fn album_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(
            handlers::album::list_albums,
            handlers::album::create_album
        ))
        .routes(routes!(
            handlers::album::update_album,
            handlers::album::delete_album
        ))
        .routes(routes!(
            handlers::album::list_album_photos,
            handlers::album::append_album_photos,
            handlers::album::replace_album_photos
        ))
        .routes(routes!(handlers::album::remove_album_photo))
        .routes(routes!(handlers::album::set_album_cover))
}

fn moment_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(
            handlers::moment::list_moments,
            handlers::moment::create_moment
        ))
        .routes(routes!(
            handlers::moment::update_moment,
            handlers::moment::delete_moment
        ))
        .routes(routes!(handlers::moment::set_moment_visibility))
        .routes(routes!(handlers::moment::like_moment))
}

fn place_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(
            handlers::place::list_places,
            handlers::place::create_place
        ))
        .routes(routes!(
            handlers::place::update_place,
            handlers::place::delete_place
        ))
}

fn wish_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(
            handlers::wish::list_wishes,
            handlers::wish::create_wish
        ))
        .routes(routes!(handlers::wish::delete_wish))
        .routes(routes!(handlers::wish::approve_wish))
}

fn anniversary_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(
            handlers::anniversary::list_anniversaries,
            handlers::anniversary::create_anniversary
        ))
        .routes(routes!(
            handlers::anniversary::update_anniversary,
            handlers::anniversary::delete_anniversary
        ))
}

fn user_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(handlers::user::login))
        .routes(routes!(handlers::user::me))
        .routes(routes!(handlers::user::list_users))
        .routes(routes!(handlers::user::update_user))
        .routes(routes!(handlers::user::list_user_avatars))
        .routes(routes!(handlers::user::remove_user_avatar))
}

fn system_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(
            handlers::system::init_system,
            handlers::system::init_status
        ))
        .routes(routes!(handlers::system::system_info))
        .routes(routes!(
            handlers::system::get_site_settings,
            handlers::system::save_site_settings
        ))
        .routes(routes!(handlers::system::dashboard_stats))
}
