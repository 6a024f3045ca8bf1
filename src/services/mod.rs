pub mod admin_service;
pub use admin_service::{AdminError, AdminService, AdminStats};

pub mod admin_service_impl;
pub use admin_service_impl::SeaOrmAdminService;

pub mod auth_service;
pub use auth_service::{AuthError, AuthService};

pub mod auth_service_impl;
pub use auth_service_impl::SeaOrmAuthService;

pub mod download_service;
pub mod download_service_impl;
pub use download_service::{
    DownloadError, DownloadResult, DownloadService, PlaylistDownloadResult,
};
pub use download_service_impl::SeaOrmDownloadService;

pub mod extractor;
pub use extractor::{
    AudioExtractor, ExtractMode, ExtractedItem, Extraction, ExtractorError, YtDlpExtractor,
};

pub mod library_service;
pub use library_service::{LibraryError, LibraryItem, LibraryService};

pub mod library_service_impl;
pub use library_service_impl::SeaOrmLibraryService;
