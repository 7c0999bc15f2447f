mod admin;
mod auth;
mod booking;
mod car;
mod dispatcher;
mod emergency;
mod message;
mod negotiation;
mod rating;
mod trip;
mod user;
