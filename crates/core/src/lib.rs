pub mod achievement;
pub mod admin_email;
pub mod caller;
pub mod investment_rate;
pub mod settings;

pub use achievement::Achievement;
pub use admin_email::AdminEmail;
pub use caller::{CallerContext, Principal};
pub use investment_rate::InvestmentRate;
pub use settings::{SystemSetting, ValidationRule};
