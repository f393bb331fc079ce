mod subscriber_email;
mod subscriber_hash;
mod tag;
// allow external `use` statements to skip `subscriber_email` etc
pub use subscriber_email::SubscriberEmail;
pub use subscriber_hash::SubscriberHash;
pub use tag::Tag;
pub use tag::TagList;
pub use tag::TagStatus;
