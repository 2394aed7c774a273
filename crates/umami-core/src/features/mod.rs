// Feature controllers: thin policy layers over the mutation executor.
//
// Each encodes one feature's request shape, authorization gate, and
// rollback value. State is per displayed entity, rehydrated from server
// data on (re)fetch, and mutated only through the executor.

mod comment;
mod favorite;
mod follow;
mod notifications;
mod rating;

pub use comment::CommentThread;
pub use favorite::FavoriteController;
pub use follow::FollowController;
pub use notifications::NotificationBadge;
pub use rating::RatingController;
