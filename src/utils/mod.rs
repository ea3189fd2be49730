pub mod code_generator;
pub mod url_validator;

pub use code_generator::{CodeGenerator, EntropySource, ThreadRngEntropy, is_valid_short_code};
pub use url_validator::{UrlValidationError, validate_url};
