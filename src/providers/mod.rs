// One adapter per external source. Shared logic never branches on provider
// identity; new sources are added by implementing ProviderAdapter here and
// registering the adapter in build_providers.

pub mod bandsintown;
pub mod dice;
pub mod eventbrite;
pub mod nts;
pub mod resident_advisor;
pub mod ticketmaster;

pub use bandsintown::BandsintownProvider;
pub use dice::DiceProvider;
pub use eventbrite::EventbriteProvider;
pub use nts::NtsProvider;
pub use resident_advisor::ResidentAdvisorProvider;
pub use ticketmaster::TicketmasterProvider;

use crate::config::Config;
use crate::types::ProviderAdapter;

/// Build every provider adapter from configuration. Adapters whose credential
/// is missing stay in the list; the aggregator short-circuits them to a
/// failure diagnostic without a network call.
pub fn build_providers(config: &Config) -> Vec<Box<dyn ProviderAdapter>> {
    let timeouts = &config.settings.providers;
    vec![
        Box::new(TicketmasterProvider::new(
            config.ticketmaster_api_key.clone(),
            timeouts.ticketmaster_timeout(),
        )),
        Box::new(BandsintownProvider::new(
            config.bandsintown_app_id.clone(),
            timeouts.default_timeout(),
        )),
        Box::new(EventbriteProvider::new(
            config.eventbrite_api_key.clone(),
            timeouts.default_timeout(),
        )),
        Box::new(ResidentAdvisorProvider::new(timeouts.default_timeout())),
        Box::new(DiceProvider::new(
            config.dice_api_key.clone(),
            timeouts.default_timeout(),
        )),
        Box::new(NtsProvider::new(timeouts.default_timeout())),
    ]
}
