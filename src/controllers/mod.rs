pub mod home_controller;
pub mod my_user_controller;
pub mod order_controller;
pub mod restaurant_controller;
