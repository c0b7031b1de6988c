#[macro_use]
extern crate rocket;

pub mod api_error;
pub mod auth;
pub mod boards;
pub mod colors;
pub mod data;
pub mod tasks;
pub mod templates;

use rocket::fs::FileServer;
use rocket::{Build, Rocket};

use data::DBConnection;

pub fn rocket(connection: DBConnection) -> Rocket<Build> {
    // FileServer insists the directory exists before launch.
    let _ = std::fs::create_dir_all(auth::helpers::AVATAR_DIR);

    rocket::build()
        .manage(connection)
        .mount(
            "/api/auth",
            routes![
                auth::endpoints::register,
                auth::endpoints::login,
                auth::endpoints::me,
                auth::endpoints::upload_avatar,
            ],
        )
        .mount(
            "/api/boards",
            routes![
                boards::endpoints::add_board,
                boards::endpoints::get_boards,
                boards::endpoints::get_board,
                boards::endpoints::delete_board,
                boards::endpoints::add_member,
            ],
        )
        .mount(
            "/api/tasks",
            routes![
                tasks::endpoints::get_board_tasks,
                tasks::endpoints::add_task,
                tasks::endpoints::update_task,
                tasks::endpoints::delete_task,
                tasks::endpoints::move_task,
                tasks::endpoints::update_orders,
            ],
        )
        .mount(
            "/api/templates",
            routes![
                templates::endpoints::get_templates,
                templates::endpoints::get_template,
                templates::endpoints::add_template,
            ],
        )
        .mount("/api/colors", routes![colors::endpoints::get_colors])
        .mount("/avatars", FileServer::from(auth::helpers::AVATAR_DIR))
        .register(
            "/",
            catchers![
                api_error::unauthorized_catcher,
                api_error::forbidden_catcher,
                api_error::not_found_catcher,
                api_error::unprocessable_catcher,
                api_error::default_catcher,
            ],
        )
}
