pub mod models;
pub mod pii;

pub use models::order::{Order, OrderLine, OrderStatus, OrderView, OrderLineView, OrderSummary};
pub use models::purchase::{PurchaseRequest, PurchaseLine};
pub use models::user::UserProfile;
