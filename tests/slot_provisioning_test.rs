// ==========================================
// 槽位生成 / 槽位登记集成测试
// ==========================================
// 职责: 验证建机批量生成槽位、懒创建幂等、分组排序、跨租户访问
// ==========================================


#[cfg(test)]
mod slot_provisioning_test {
    use genset_tracker::api::validator::MAX_SLOT_QUANTITY;
    use genset_tracker::api::{ApiError, CreateEngineRequest};
    use genset_tracker::domain::{Installation, SlotQuantities};
    use genset_tracker::ComponentCategory;

    use crate::test_helpers::{build_fleet, d, find_slot, setup_state, tenant};

    fn request(model_id: &str, quantities: SlotQuantities) -> CreateEngineRequest {
        CreateEngineRequest {
            name: "GMG-09".to_string(),
            model_id: model_id.to_string(),
            serial_number: "SN-09".to_string(),
            location: "Usina Sul".to_string(),
            hours_total: 0,
            starts_total: 0,
            in_operation: false,
            slot_quantities: quantities,
        }
    }

    #[test]
    fn test_建机_默认数量生成全部槽位() {
        let (_tmp, state) = setup_state();
        let ctx = tenant("t1");
        let model = state.asset_api.register_model(&ctx, "Jenbacher", "J620").unwrap();

        let response = state
            .asset_api
            .create_engine(&ctx, request(&model.model_id, SlotQuantities::default()))
            .unwrap();

        // 油路 3 + 外围 10 + 滤清器 2 + 气缸 24 + 点火 26 + 冷却液 1
        assert_eq!(response.slots_created, 66);
        assert_eq!(response.engine.slot_quantities.ignition_coils, 12, "按缸数补齐");
        assert_eq!(response.engine.slot_quantities.plug_cables, 12);

        let slots = state.component_api.list_slots(&ctx, &response.engine.engine_id).unwrap();
        assert_eq!(slots.len(), 66);
        assert_eq!(slots.first().unwrap().name, "Engine Oil (Sump)");
        assert_eq!(slots.last().unwrap().name, "Coolant");
        assert!(slots.iter().all(|s| s.installed_part_id.is_none() && s.install_hours == 0));

        let groups = state.component_api.list_groups(&ctx, &response.engine.engine_id).unwrap();
        let names: Vec<_> = groups.iter().map(|g| g.name.as_str()).collect();
        assert_eq!(
            names,
            vec!["Oil System", "Filters", "Peripherals", "Ignition / Electrical", "Cylinders", "Other"]
        );
    }

    #[test]
    fn test_槽位按类型与序号排序() {
        let (_tmp, state) = setup_state();
        let ctx = tenant("t1");
        let model = state.asset_api.register_model(&ctx, "MWM", "TCG 2020").unwrap();
        let quantities = SlotQuantities {
            cylinders: 10,
            ..SlotQuantities::default()
        };
        let engine = state
            .asset_api
            .create_engine(&ctx, request(&model.model_id, quantities))
            .unwrap()
            .engine;

        let plugs: Vec<_> = state
            .component_api
            .list_slots(&ctx, &engine.engine_id)
            .unwrap()
            .into_iter()
            .filter(|s| s.base_name.as_deref() == Some("Cylinder Spark Plug"))
            .map(|s| s.seq_no)
            .collect();
        assert_eq!(plugs, (1..=10).collect::<Vec<_>>(), "按序号排序而非按名称字典序");
    }

    #[test]
    fn test_懒创建槽位_幂等() {
        let (_tmp, state) = setup_state();
        let fleet = build_fleet(&state, "t1");
        let engine_id = fleet.engine.engine_id.clone();
        let before = state.component_api.list_slots(&fleet.ctx, &engine_id).unwrap().len();

        let first = state
            .component_api
            .ensure_slot(&fleet.ctx, &engine_id, "Turbo", Some(3), ComponentCategory::Peripherals)
            .unwrap();
        assert_eq!(first.name, "Turbo #03");
        let again = state
            .component_api
            .ensure_slot(&fleet.ctx, &engine_id, "Turbo", Some(3), ComponentCategory::Peripherals)
            .unwrap();
        assert_eq!(first.slot_id, again.slot_id);

        // 已存在的槽位原样返回（含安装基线）
        let existing = state
            .component_api
            .ensure_slot(&fleet.ctx, &engine_id, "Turbo", Some(1), ComponentCategory::Peripherals)
            .unwrap();
        assert_eq!(existing.slot_id, fleet.turbo_slot.slot_id);
        assert_eq!(existing.install_hours, 800);

        let water_pump = state
            .component_api
            .ensure_slot(&fleet.ctx, &engine_id, "Water Pump", None, ComponentCategory::Other)
            .unwrap();
        assert_eq!(water_pump.name, "Water Pump");

        let after = state.component_api.list_slots(&fleet.ctx, &engine_id).unwrap().len();
        assert_eq!(after, before + 2);
    }

    #[test]
    fn test_懒创建槽位_输入校验() {
        let (_tmp, state) = setup_state();
        let fleet = build_fleet(&state, "t1");

        assert!(matches!(
            state.component_api.ensure_slot(
                &fleet.ctx,
                &fleet.engine.engine_id,
                "  ",
                None,
                ComponentCategory::Other
            ),
            Err(ApiError::InvalidInput(_))
        ));
        assert!(matches!(
            state.component_api.ensure_slot(
                &fleet.ctx,
                &fleet.engine.engine_id,
                "Turbo",
                Some(0),
                ComponentCategory::Peripherals
            ),
            Err(ApiError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_跨租户访问() {
        let (_tmp, state) = setup_state();
        let fleet = build_fleet(&state, "t1");
        let stranger = tenant("t2");

        assert!(matches!(
            state.component_api.list_slots(&stranger, &fleet.engine.engine_id),
            Err(ApiError::PermissionDenied(_))
        ));
        assert!(matches!(
            state.component_api.ensure_slot(
                &stranger,
                &fleet.engine.engine_id,
                "Turbo",
                Some(5),
                ComponentCategory::Peripherals
            ),
            Err(ApiError::PermissionDenied(_))
        ));
        assert!(matches!(
            state.asset_api.get_engine(&stranger, &fleet.engine.engine_id),
            Err(ApiError::PermissionDenied(_))
        ));
        assert!(matches!(
            state.asset_api.get_engine(&stranger, "missing"),
            Err(ApiError::NotFound(_))
        ));
        assert!(state.asset_api.list_engines(&stranger).unwrap().is_empty());

        // 其他租户的机型不可用于建机
        assert!(matches!(
            state
                .asset_api
                .create_engine(&stranger, request(&fleet.model.model_id, SlotQuantities::default())),
            Err(ApiError::PermissionDenied(_))
        ));
    }

    #[test]
    fn test_槽位登记_安装与润滑() {
        let (_tmp, state) = setup_state();
        let fleet = build_fleet(&state, "t1");
        let engine_id = fleet.engine.engine_id.clone();
        let damper = find_slot(&state, &fleet.ctx, &engine_id, "Damper");

        let installed = state
            .slot_registry
            .apply_installation(
                &fleet.ctx,
                &engine_id,
                &damper.slot_id,
                &Installation {
                    part_id: None,
                    serial_number: Some("DMP-1".to_string()),
                    installed_on: d(2024, 2, 1),
                    hours_at_install: 950,
                    starts_at_install: 45,
                },
            )
            .unwrap();
        assert_eq!(installed.install_hours, 950);

        let usage = state.slot_registry.usage(&fleet.ctx, &engine_id, &damper.slot_id).unwrap();
        assert_eq!((usage.hours, usage.starts), (50, 5));

        state
            .slot_registry
            .record_lubrication(&fleet.ctx, &engine_id, &damper.slot_id, d(2024, 3, 1))
            .unwrap();
        let damper = find_slot(&state, &fleet.ctx, &engine_id, "Damper");
        assert_eq!(damper.last_greased_on, Some(d(2024, 3, 1)));
        assert_eq!(damper.serial_number.as_deref(), Some("DMP-1"));

        // 槽位不属于该机组
        let other = state
            .asset_api
            .create_engine(&fleet.ctx, request(&fleet.model.model_id, SlotQuantities::default()))
            .unwrap()
            .engine;
        assert!(state
            .slot_registry
            .usage(&fleet.ctx, &other.engine_id, &damper.slot_id)
            .is_err());
    }

    #[test]
    fn test_重新生成_只补齐缺失槽位() {
        let (_tmp, state) = setup_state();
        let fleet = build_fleet(&state, "t1");
        let provisioner = genset_tracker::SlotProvisioner::new(std::sync::Arc::new(std::sync::Mutex::new(
            genset_tracker::db::open_sqlite_connection(&state.db_path).unwrap(),
        )));

        let created = provisioner.reprovision(&fleet.ctx, &fleet.engine.engine_id).unwrap();
        assert_eq!(created, 0);

        let slot = find_slot(&state, &fleet.ctx, &fleet.engine.engine_id, "Turbo #01");
        assert_eq!(slot.install_hours, 800, "已有槽位不被覆盖");
    }

    #[test]
    fn test_建机_槽位数量超出上限被拒绝() {
        let (_tmp, state) = setup_state();
        let ctx = tenant("t1");
        let model = state.asset_api.register_model(&ctx, "Jenbacher", "J620").unwrap();

        for quantities in [
            SlotQuantities {
                cylinders: u32::MAX,
                ..SlotQuantities::default()
            },
            SlotQuantities {
                turbos: MAX_SLOT_QUANTITY + 1,
                ..SlotQuantities::default()
            },
        ] {
            assert!(matches!(
                state.asset_api.create_engine(&ctx, request(&model.model_id, quantities)),
                Err(ApiError::InvalidInput(_))
            ));
        }
        assert!(state.asset_api.list_engines(&ctx).unwrap().is_empty());

        let response = state
            .asset_api
            .create_engine(
                &ctx,
                request(
                    &model.model_id,
                    SlotQuantities {
                        turbos: MAX_SLOT_QUANTITY,
                        ..SlotQuantities::default()
                    },
                ),
            )
            .unwrap();
        assert_eq!(response.slots_created, 66 - 2 + MAX_SLOT_QUANTITY as usize);
    }
}
