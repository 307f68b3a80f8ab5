use dotenv::dotenv;
use movie_booking_system::db::Database;
use movie_booking_system::routes;
use movie_booking_system::services;
use movie_booking_system::swagger::swagger_ui;
use rocket::fairing::AdHoc;
use rocket_okapi::openapi_get_routes;
use rocket_okapi::swagger_ui::make_swagger_ui;

#[rocket::launch]
async fn rocket() -> _ {
    dotenv().ok();

    // Connect to the database
    let database = Database::new(
        &std::env::var("DATABASE_URL").expect("DATABASE_URL must be set"),
    )
    .await
    .expect("Failed to connect to database");
    database
        .init_schema()
        .await
        .expect("Failed to initialize database schema");
    let pool = database.pool.clone();

    // Initialize the services
    let user_service = services::user_service::UserService::new(pool.clone());
    let movie_service = services::movie_service::MovieService::new(pool.clone());
    let review_service = services::review_service::ReviewService::new(pool.clone());
    let theatre_service = services::theatre_service::TheatreService::new(pool.clone());
    let booking_service = services::booking_service::BookingService::new(pool.clone());
    let payment_service = services::payment_service::PaymentService::new(pool.clone());

    rocket::build()
        .manage(user_service)
        .manage(movie_service)
        .manage(review_service)
        .manage(theatre_service)
        .manage(booking_service)
        .manage(payment_service)
        .mount(
            "/api",
            openapi_get_routes![
                routes::user_route::register,
                routes::user_route::login,
                routes::user_route::get_profile,
                routes::user_route::update_profile,
                routes::user_route::change_password,
                routes::user_route::get_users,
                routes::user_route::get_user_by_id,
                routes::user_route::block_user,
                routes::user_route::delete_user,
                routes::movie_route::get_movies,
                routes::movie_route::get_movie_by_id,
                routes::movie_route::create_movie,
                routes::movie_route::update_movie,
                routes::movie_route::delete_movie,
                routes::review_route::get_movie_reviews,
                routes::review_route::add_review,
                routes::review_route::update_review,
                routes::review_route::delete_review,
                routes::theatre_route::get_theatres,
                routes::theatre_route::get_availability,
                routes::theatre_route::get_theatre_by_id,
                routes::theatre_route::create_theatre,
                routes::theatre_route::update_theatre,
                routes::theatre_route::delete_theatre,
                routes::theatre_route::add_show,
                routes::theatre_route::update_show,
                routes::theatre_route::delete_show,
                routes::booking_route::create_booking,
                routes::booking_route::get_my_bookings,
                routes::booking_route::get_all_bookings,
                routes::booking_route::get_booking_by_id,
                routes::booking_route::update_payment_status,
                routes::booking_route::cancel_booking,
                routes::payment_route::create_order,
                routes::payment_route::verify_payment,
                routes::payment_route::generate_checkout_hash,
                routes::payment_route::checkout_callback,
            ],
        )
        .mount("/swagger", make_swagger_ui(&swagger_ui()))
        .attach(AdHoc::on_response("CORS", |_, res| {
            Box::pin(async move {
                res.set_header(rocket::http::Header::new(
                    "Access-Control-Allow-Origin",
                    "*",
                ));
            })
        }))
}
