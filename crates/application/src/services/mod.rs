mod image_service;
mod session_service;
mod user_service;
mod withdrawal_service;


pub use image_service::{
    ConvertedImage, ImageService, ImageServiceDependencies, StoredImage, UPLOADS_URL_PREFIX,
};
pub use session_service::{SessionService, SessionServiceDependencies};
pub use user_service::{
    AuthenticateUserRequest, ChangePasswordRequest, RegisterUserRequest, UserService,
    UserServiceDependencies,
};
pub use withdrawal_service::{
    SubmitWithdrawalRequest, WithdrawalService, WithdrawalServiceDependencies,
    DEFAULT_WITHDRAWAL_PAGE,
};
