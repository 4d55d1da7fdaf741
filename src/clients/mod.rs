// 外部服务客户端
// 用户服务（金币余额、两阶段支付）与推荐服务（邀请人数）

pub mod payment;

pub use payment::{HttpPaymentGateway, PaymentGateway};
