pub mod comment;
pub mod task;
pub mod token;
pub mod user;

pub use comment::{Comment, CommentInput, NewComment};
pub use task::{NewTask, Priority, Task, TaskInput, TaskStatus};
pub use token::{NewToken, Token, TokenType};
pub use user::{NewUser, Role, User};
