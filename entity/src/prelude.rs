pub use super::auto_accept_rule::Entity as AutoAcceptRule;
pub use super::booking::Entity as Booking;
pub use super::car::Entity as Car;
pub use super::emergency_alert::Entity as EmergencyAlert;
pub use super::emergency_contact::Entity as EmergencyContact;
pub use super::message::Entity as Message;
pub use super::message_thread::Entity as MessageThread;
pub use super::negotiation_offer::Entity as NegotiationOffer;
pub use super::notification::Entity as Notification;
pub use super::price_negotiation::Entity as PriceNegotiation;
pub use super::rating::Entity as Rating;
pub use super::sms_verification::Entity as SmsVerification;
pub use super::thread_participant::Entity as ThreadParticipant;
pub use super::travel_preference::Entity as TravelPreference;
pub use super::trip::Entity as Trip;
pub use super::user::Entity as User;
pub use super::user_settings::Entity as UserSettings;
