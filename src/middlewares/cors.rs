use actix_cors::Cors;

pub fn create_cors() -> Cors {
    Cors::default()
        .allowed_origin_fn(|_, _req_head| {
            // the tracker frontend is served from a few internal hosts;
            // lock this down if it ever leaves the intranet
            true
        })
        .allowed_methods(vec!["GET", "POST", "PATCH", "DELETE", "OPTIONS"])
        .allow_any_header()
        .max_age(3600)
}
