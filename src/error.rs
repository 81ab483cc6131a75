use argon2::Error as Argon2Error;
use jsonwebtoken::errors::{Error as JwtError, ErrorKind as JwtErrorKind};
use rocket::{http::Status, response::Responder, Request};
use thiserror::Error;

use crate::model::{candidate::CandidateId, voter::VoterId};

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// A phase guard was violated, or a prerequisite such as a non-empty
    /// roster is missing.
    #[error("Precondition failed: {0}")]
    PreconditionFailed(String),
    /// The candidate or voter cap has been reached.
    #[error("Capacity exceeded: {0}")]
    CapacityExceeded(String),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("No candidate with ID {0}")]
    CandidateNotFound(CandidateId),
    #[error("No voter with ID {0}")]
    VoterNotFound(VoterId),
    #[error("Voter {0} has already voted")]
    AlreadyVoted(VoterId),
    #[error("The election is not ongoing")]
    ElectionNotOngoing,
    /// The store itself failed; this is never a judgement on the request.
    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),
    #[error("Bad request: {0}")]
    BadRequest(String),
    #[error("Malformed request body: {0}")]
    MalformedBody(String),
    #[error("Unauthorized: {0}")]
    Unauthorized(String),
    #[error(transparent)]
    Jwt(#[from] JwtError),
    #[error(transparent)]
    Argon2(#[from] Argon2Error),
}

impl Error {
    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound(what.into())
    }

    /// The HTTP status this error is reported with.
    pub fn status(&self) -> Status {
        match self {
            Self::PreconditionFailed(_) | Self::AlreadyVoted(_) => Status::Conflict,
            Self::CapacityExceeded(_) | Self::MalformedBody(_) => Status::UnprocessableEntity,
            Self::NotFound(_) | Self::CandidateNotFound(_) | Self::VoterNotFound(_) => {
                Status::NotFound
            }
            Self::ElectionNotOngoing => Status::Forbidden,
            Self::StoreUnavailable(_) => Status::ServiceUnavailable,
            Self::BadRequest(_) => Status::BadRequest,
            Self::Unauthorized(_) => Status::Unauthorized,
            Self::Jwt(err) => match err.kind() {
                JwtErrorKind::ExpiredSignature | JwtErrorKind::ImmatureSignature => {
                    Status::Unauthorized
                }
                _ => Status::BadRequest,
            },
            Self::Argon2(_) => Status::InternalServerError,
        }
    }
}

impl<'r, 'o: 'r> Responder<'r, 'o> for Error {
    fn respond_to(self, req: &'r Request<'_>) -> rocket::response::Result<'o> {
        let status = self.status();
        if status.code >= 500 {
            error!("{} {}: {self}", req.method(), req.uri());
        } else {
            warn!("{} {}: {self}", req.method(), req.uri());
        }
        Err(status)
    }
}
