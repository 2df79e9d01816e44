use thiserror::Error;

#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Missing URL (set --url or provide in config).")]
    MissingUrl,
    #[error("Invalid URL '{url}': {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
    #[error("URL is missing host.")]
    UrlMissingHost,
    #[error("Duration must not be empty.")]
    DurationEmpty,
    #[error("Invalid duration '{value}'.")]
    InvalidDurationFormat { value: String },
    #[error("Invalid duration '{value}': {source}")]
    InvalidDurationNumber {
        value: String,
        #[source]
        source: std::num::ParseIntError,
    },
    #[error("Duration overflow.")]
    DurationOverflow,
    #[error("Invalid duration unit '{unit}'.")]
    InvalidDurationUnit { unit: String },
    #[error("Duration must be > 0.")]
    DurationZero,
    #[error("Value must be >= {min}.")]
    ValueTooSmall { min: u64 },
    #[error("Invalid value: {source}")]
    InvalidNumber {
        #[source]
        source: std::num::ParseIntError,
    },
    #[error("Invalid ratio '{value}': {source}")]
    InvalidRatioNumber {
        value: String,
        #[source]
        source: std::num::ParseFloatError,
    },
    #[error("Ratio '{value}' must be within [0, 1].")]
    RatioOutOfRange { value: String },
    #[error("think-min-ms must be <= think-max-ms.")]
    ThinkTimeInverted,
    #[error("At least one hot key is required.")]
    HotKeysEmpty,
    #[error("tail-size must be >= 1 when hot-ratio is below 1.")]
    TailRequired,
    #[error("Query weight table must not be empty.")]
    QueryWeightsEmpty,
    #[error("Query weights must include at least one positive weight.")]
    QueryWeightsInvalid,
}
