pub mod order;
pub mod restaurant;
pub mod user;

pub use order::{CartItem, DeliveryDetails, Order, OrderStatus, OrderWithRelations};
pub use restaurant::{MenuItem, Restaurant};
pub use user::{CurrentUser, TokenSubject, User};
