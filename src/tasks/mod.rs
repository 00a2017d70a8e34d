pub mod draft_sweeper;
