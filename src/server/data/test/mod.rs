mod booking;
mod negotiation;
mod notification;
mod trip;
