// comanda_server/src/web/routes.rs

use actix_web::web;

// Simple liveness probe. Deeper checks (DB connectivity) belong in a
// readiness endpoint if one is ever needed.
async fn health_check_handler() -> actix_web::HttpResponse {
  actix_web::HttpResponse::Ok().json(serde_json::json!({ "status": "ok" }))
}

// This function is called in `main.rs` to configure services for the Actix App.
pub fn configure_app_routes(cfg: &mut web::ServiceConfig) {
  use crate::web::handlers::*;

  cfg.service(
    web::scope("/api/v1") // Base path for API version 1
      // Health Check Route
      .route("/health", web::get().to(health_check_handler))
      // Admin Authentication
      .service(web::scope("/auth").route("/login", web::post().to(auth_handlers::login_handler)))
      // Menu Catalog (read-only)
      .service(
        web::scope("/menu")
          .route("", web::get().to(menu_handlers::list_menu_handler))
          .route("/{id_or_slug}", web::get().to(menu_handlers::get_menu_item_handler)),
      )
      // Guest Orders
      .service(
        web::scope("/orders")
          .route("", web::post().to(order_handlers::create_order_handler))
          .route("/track", web::post().to(order_handlers::track_order_post_handler))
          .route(
            "/track/{tracking_number}",
            web::get().to(order_handlers::track_order_handler),
          )
          .route("/{id}", web::get().to(order_handlers::get_order_handler)),
      )
      // Admin Orders (bearer token required via the AdminUser extractor)
      .service(
        web::scope("/admin/orders")
          .route("", web::get().to(admin_order_handlers::list_orders_handler))
          .route(
            "/{id}/status",
            web::put().to(admin_order_handlers::update_order_status_handler),
          )
          .route(
            "/{id}/mark-paid",
            web::put().to(admin_order_handlers::mark_order_paid_handler),
          )
          .route("/{id}/eta", web::put().to(admin_order_handlers::update_order_eta_handler))
          .route("/{id}", web::delete().to(admin_order_handlers::delete_order_handler)),
      )
      // Standalone Payment Records
      .service(
        web::scope("/payments")
          .route("/guest", web::post().to(payment_handlers::create_guest_payment_handler))
          .route("/{id}/confirm", web::post().to(payment_handlers::confirm_payment_handler))
          .route("", web::get().to(payment_handlers::list_payments_handler))
          .route(
            "/{id}/mark-paid",
            web::put().to(payment_handlers::mark_payment_paid_handler),
          )
          .route("/{id}/status", web::patch().to(payment_handlers::update_payment_status_handler))
          .route("/{id}", web::get().to(payment_handlers::get_payment_handler)),
      )
      // Gateway Webhook (raw body required for signature verification)
      .service(web::scope("/webhooks").route("/stripe", web::post().to(webhook_handlers::stripe_webhook_handler))),
  );
}
