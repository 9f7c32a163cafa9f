use std::sync::Arc;

use adapter::database::ConnectionPool;
use adapter::repository::{
    booking::BookingRepositoryImpl, comment::CommentRepositoryImpl,
    health::HealthCheckRepositoryImpl, item::ItemRepositoryImpl,
    item_request::ItemRequestRepositoryImpl, user::UserRepositoryImpl,
};
use kernel::repository::{
    booking::BookingRepository, comment::CommentRepository, health::HealthCheckRepository,
    item::ItemRepository, item_request::ItemRequestRepository, user::UserRepository,
};

#[derive(Clone)]
pub struct AppRegistry {
    health_check_repository: Arc<dyn HealthCheckRepository>,
    user_repository: Arc<dyn UserRepository>,
    item_repository: Arc<dyn ItemRepository>,
    booking_repository: Arc<dyn BookingRepository>,
    comment_repository: Arc<dyn CommentRepository>,
    item_request_repository: Arc<dyn ItemRequestRepository>,
}

impl AppRegistry {
    pub fn new(pool: ConnectionPool) -> Self {
        let health_check_repository = Arc::new(HealthCheckRepositoryImpl::new(pool.clone()));
        let user_repository = Arc::new(UserRepositoryImpl::new(pool.clone()));
        let item_repository = Arc::new(ItemRepositoryImpl::new(pool.clone()));
        let booking_repository = Arc::new(BookingRepositoryImpl::new(pool.clone()));
        let comment_repository = Arc::new(CommentRepositoryImpl::new(pool.clone()));
        let item_request_repository = Arc::new(ItemRequestRepositoryImpl::new(pool.clone()));
        Self {
            health_check_repository,
            user_repository,
            item_repository,
            booking_repository,
            comment_repository,
            item_request_repository,
        }
    }

    pub fn health_check_repository(&self) -> Arc<dyn HealthCheckRepository> {
        self.health_check_repository.clone()
    }

    pub fn user_repository(&self) -> Arc<dyn UserRepository> {
        self.user_repository.clone()
    }

    pub fn item_repository(&self) -> Arc<dyn ItemRepository> {
        self.item_repository.clone()
    }

    pub fn booking_repository(&self) -> Arc<dyn BookingRepository> {
        self.booking_repository.clone()
    }

    pub fn comment_repository(&self) -> Arc<dyn CommentRepository> {
        self.comment_repository.clone()
    }

    pub fn item_request_repository(&self) -> Arc<dyn ItemRequestRepository> {
        self.item_request_repository.clone()
    }
}
