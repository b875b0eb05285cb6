/// Provider identifiers used in `Event.source` and as diagnostics keys.
pub const TICKETMASTER: &str = "ticketmaster";
pub const BANDSINTOWN: &str = "bandsintown";
pub const EVENTBRITE: &str = "eventbrite";
pub const RESIDENT_ADVISOR: &str = "resident_advisor";
pub const DICE: &str = "dice";
pub const NTS: &str = "nts";

// Upstream API endpoints
pub const SPOTIFY_API: &str = "https://api.spotify.com/v1";
pub const TICKETMASTER_API: &str = "https://app.ticketmaster.com/discovery/v2";
pub const BANDSINTOWN_API: &str = "https://rest.bandsintown.com";
pub const EVENTBRITE_API: &str = "https://www.eventbriteapi.com/v3";
pub const RESIDENT_ADVISOR_API: &str = "https://ra.co/api/v1";
pub const DICE_API: &str = "https://api.dice.fm/v1";
pub const NTS_API: &str = "https://www.nts.live/api/v2";
pub const OPENAI_API: &str = "https://api.openai.com/v1";

/// Substituted when a provider cannot name the venue.
pub const FALLBACK_VENUE: &str = "TBD";

/// Result-size cap requested from each provider.
pub const PROVIDER_RESULT_CAP: usize = 50;

// Matching tiers
pub const DIRECT_MATCH_CONFIDENCE: f64 = 0.95;
pub const SIMILARITY_MATCH_CONFIDENCE: f64 = 0.7;
/// AI-tier entries at or below this confidence are discarded.
pub const AI_MIN_CONFIDENCE: f64 = 0.6;
pub const AI_PROMPT_MAX_ARTISTS: usize = 10;
pub const AI_PROMPT_MAX_EVENTS: usize = 20;
pub const AI_MAX_MATCHES: usize = 5;
pub const SIMILARITY_SEED_LIMIT: usize = 3;
pub const SIMILARITY_PER_SEED_LIMIT: usize = 5;

/// Final recommendation list is truncated to this many entries.
pub const MAX_RECOMMENDATIONS: usize = 10;
/// Top artists echoed back in the response for display.
pub const TOP_ARTISTS_DISPLAYED: usize = 5;
