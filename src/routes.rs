use crate::{
    api::{adjustment, assignment, ledger, punch, summary},
    config::Config,
};
use actix_governor::{
    Governor, GovernorConfigBuilder, PeerIpKeyExtractor, governor::middleware::NoOpMiddleware,
};
use actix_web::web;
use std::sync::Arc;

pub fn configure(cfg: &mut web::ServiceConfig, config: Config) {
    // Helper to build per-route limiter
    fn build_limiter(requests_per_min: u32) -> Governor<PeerIpKeyExtractor, NoOpMiddleware> {
        let per_ms = if requests_per_min == 0 {
            1
        } else {
            60_000 / requests_per_min as u64
        };
        let cfg = GovernorConfigBuilder::default()
            .per_millisecond(per_ms)
            .burst_size(requests_per_min)
            .key_extractor(PeerIpKeyExtractor)
            .finish()
            .unwrap();
        Governor::new(&cfg)
    }

    let mutation_limiter = Arc::new(build_limiter(config.rate_mutation_per_min));
    let query_limiter = Arc::new(build_limiter(config.rate_query_per_min));

    cfg.service(
        web::scope(&config.api_prefix)
            .service(
                web::scope("/punches")
                    // /punches
                    .service(
                        web::resource("")
                            .wrap(mutation_limiter.clone())
                            .route(web::post().to(punch::create_punch)),
                    )
                    // /punches/day
                    .service(
                        web::resource("/day")
                            .wrap(query_limiter.clone())
                            .route(web::get().to(punch::list_punches)),
                    )
                    // /punches/{id}
                    .service(
                        web::resource("/{id}")
                            .wrap(mutation_limiter.clone())
                            .route(web::delete().to(punch::delete_punch)),
                    ),
            )
            .service(
                web::scope("/summaries")
                    // /summaries
                    .service(
                        web::resource("")
                            .wrap(query_limiter.clone())
                            .route(web::get().to(summary::get_summary)),
                    )
                    // /summaries/recalculate
                    .service(
                        web::resource("/recalculate")
                            .wrap(mutation_limiter.clone())
                            .route(web::post().to(summary::recalculate_summary)),
                    ),
            )
            .service(
                web::scope("/adjustments")
                    // /adjustments
                    .service(
                        web::resource("")
                            .wrap(mutation_limiter.clone())
                            .route(web::post().to(adjustment::create_adjustment)),
                    )
                    // /adjustments/{id}
                    .service(
                        web::resource("/{id}")
                            .wrap(query_limiter.clone())
                            .route(web::get().to(adjustment::get_adjustment)),
                    )
                    // /adjustments/{id}/decide
                    .service(
                        web::resource("/{id}/decide")
                            .wrap(mutation_limiter.clone())
                            .route(web::put().to(adjustment::decide_adjustment)),
                    )
                    // /adjustments/{id}/apply
                    .service(
                        web::resource("/{id}/apply")
                            .wrap(mutation_limiter.clone())
                            .route(web::post().to(adjustment::apply_adjustment)),
                    ),
            )
            .service(
                web::scope("/bank-hours")
                    // /bank-hours
                    .service(
                        web::resource("")
                            .wrap(mutation_limiter.clone())
                            .route(web::post().to(ledger::create_entry)),
                    )
                    // /bank-hours/balance
                    .service(
                        web::resource("/balance")
                            .wrap(query_limiter.clone())
                            .route(web::get().to(ledger::get_balance)),
                    ),
            )
            .service(
                web::scope("/assignments")
                    // /assignments
                    .service(
                        web::resource("")
                            .wrap(mutation_limiter)
                            .route(web::post().to(assignment::create_assignment)),
                    ),
            ),
    );
}
