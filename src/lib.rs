pub mod shared {
    pub mod core {
        pub mod interval;
    }
    pub mod infrastructure {
        pub mod metric_source;
        pub mod record_sink;
        pub mod watermark_store;
    }
}

pub mod modules {
    pub mod calorie_sync {
        pub mod core {
            pub mod outcome;
            pub mod sample;
            pub mod watermark_policy;
        }
        pub mod use_cases {
            pub mod sync_calories {
                pub mod handler;
                pub mod runner;
                pub mod inbound {
                    pub mod http;
                }
            }
            pub mod today_calories {
                pub mod handler;
                pub mod inbound {
                    pub mod http;
                }
            }
        }
    }
}

pub mod shell;
