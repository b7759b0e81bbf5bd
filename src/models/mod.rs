pub mod custom_resource;
pub mod event;
pub mod response;
pub mod telegram;

pub use custom_resource::{
    CustomResourceRequest, CustomResourceResponse, CustomResourceStatus, RequestType,
};
pub use event::InboundEvent;
pub use response::{HandlerResponse, HttpResponse};
pub use telegram::{Chat, Document, Message, ParseMode, Update, WebhookReply};
