#[cfg(test)]
mod main_tests {
    use crate::commands::*;
    use common::MessagePart;
    use processor_pix::{ApiOutcome, ImageRecord, NsfwLevel, PixConfig, PixReply, PixService};
    use teloxide::utils::command::BotCommands;

    fn service(allow_group_r18: bool) -> PixService {
        let mut config = PixConfig::default();
        config.max_count = 10;
        config.allow_group_r18 = allow_group_r18;
        PixService::new(config).unwrap()
    }

    #[test]
    fn test_command_parsing() {
        let test_cases = vec![
            ("/pix 萝莉 白丝 -n 3", BotCommand::Pix("萝莉 白丝 -n 3".to_string())),
            ("/pixstar 114514-1", BotCommand::PixStar("114514-1".to_string())),
            ("/pixunstar 114514", BotCommand::PixUnstar("114514".to_string())),
            ("/pixmystar", BotCommand::PixMyStar),
            ("/pixrank 5 -r", BotCommand::PixRank("5 -r".to_string())),
            ("/info", BotCommand::Info),
            ("/help", BotCommand::Help),
        ];

        for (text, expected) in test_cases {
            let parsed = BotCommand::parse(text, "zxpixbot").unwrap();
            assert_eq!(parsed, expected, "{}", text);
        }

        assert!(BotCommand::parse("/download https://example.com", "zxpixbot").is_err());
    }

    #[test]
    fn test_pix_args() {
        let args = PixArgs::parse("萝莉 白丝 -n 10 -r -noai");
        assert_eq!(args.tags, vec!["萝莉".to_string(), "白丝".to_string()]);
        assert_eq!(args.count, 10);
        assert!(args.r18);
        assert_eq!(args.ai(), Some(false));

        let args = PixArgs::parse("-n5 风景");
        assert_eq!(args.tags, vec!["风景".to_string()]);
        assert_eq!(args.count, 5);
        assert!(!args.r18);
        assert_eq!(args.ai(), None);

        // 没有 tag 时随机抽取一张
        let args = PixArgs::parse("");
        assert!(args.tags.is_empty());
        assert_eq!(args.count, 1);

        // -n 后面不是数字时当作 tag 处理
        let args = PixArgs::parse("-n 白丝");
        assert_eq!(args.count, 1);
        assert_eq!(args.tags, vec!["白丝".to_string()]);
    }

    #[test]
    fn test_pix_args_into_query() {
        let query = PixArgs::parse("萝莉 萝莉 -n 100 -r").into_query(&service(false), true);
        assert_eq!(query.tags, vec!["萝莉".to_string()]);
        assert_eq!(query.count, 10);
        // 群聊默认不允许 r18
        assert!(!query.include_r18);

        let query = PixArgs::parse("萝莉 -r").into_query(&service(false), false);
        assert!(query.include_r18);

        let query = PixArgs::parse("萝莉 -r").into_query(&service(true), true);
        assert!(query.include_r18);
    }

    #[test]
    fn test_parse_rank_args() {
        assert_eq!(parse_rank_args(""), (DEFAULT_RANK_COUNT, false));
        assert_eq!(parse_rank_args("5"), (5, false));
        assert_eq!(parse_rank_args("-r 3"), (3, true));
        assert_eq!(parse_rank_args("abc -r"), (DEFAULT_RANK_COUNT, true));
    }

    #[test]
    fn test_outcome_text() {
        assert_eq!(
            outcome_text(&ApiOutcome::Ok(Vec::new()), NO_RESULT_TEXT),
            Some("没有找到相关图片...".to_string())
        );
        assert_eq!(
            outcome_text(&ApiOutcome::Ok(Vec::new()), EMPTY_RANK_TEXT),
            Some("排行榜还是空的...".to_string())
        );
        assert_eq!(
            outcome_text(&ApiOutcome::Failed("tag被屏蔽".to_string()), NO_RESULT_TEXT),
            Some("tag被屏蔽".to_string())
        );

        let reply = PixReply {
            record: ImageRecord {
                pid: "114514".to_string(),
                img_p: 0,
                uid: "1919810".to_string(),
                title: "夏日".to_string(),
                author: "someone".to_string(),
                url: "https://i.pximg.net/img-master/img/114514_p0.jpg".to_string(),
                is_multiple: false,
                nsfw_level: NsfwLevel::General,
                star_count: 0,
                tags: Vec::new(),
                is_ai: false,
            },
            block: vec![MessagePart::text("title: 夏日")],
        };
        assert_eq!(outcome_text(&ApiOutcome::Ok(vec![reply]), NO_RESULT_TEXT), None);
    }
}
