// ==========================================
// 库存 API 集成测试
// ==========================================
// 职责: 验证部件目录、入库、盘点、流水与低库存查询
// ==========================================


#[cfg(test)]
mod inventory_api_test {
    use genset_tracker::api::validator::MAX_INTERVAL_VALUE;
    use genset_tracker::api::{ApiError, RegisterPartRequest};
    use genset_tracker::config::config_keys;
    use genset_tracker::db::open_sqlite_connection;
    use genset_tracker::domain::{MaintenanceEventInput, StockMovement};
    use genset_tracker::repository::sql_utils::now_timestamp;
    use genset_tracker::repository::InventoryRepository;
    use genset_tracker::{MovementType, TriggerKind};
    use std::sync::{Arc, Mutex};
    use uuid::Uuid;

    use crate::test_helpers::{build_fleet, d, ledger_sum, setup_state, tenant};

    #[test]
    fn test_登记部件_校验() {
        let (_tmp, state) = setup_state();
        let fleet = build_fleet(&state, "t1");

        let part = state.inventory_api.get_part(&fleet.ctx, &fleet.turbo_part.part_id).unwrap();
        assert_eq!(part.compatible_model_ids, vec![fleet.model.model_id.clone()]);
        assert_eq!(part.life_hours, Some(20_000));

        for bad in [
            RegisterPartRequest {
                name: " ".to_string(),
                ..RegisterPartRequest::default()
            },
            RegisterPartRequest {
                name: "Oil Filter".to_string(),
                alert_pct: 0,
                ..RegisterPartRequest::default()
            },
            RegisterPartRequest {
                name: "Oil Filter".to_string(),
                units_per_install: 0,
                ..RegisterPartRequest::default()
            },
            RegisterPartRequest {
                name: "Oil Filter".to_string(),
                life_months: Some(0),
                ..RegisterPartRequest::default()
            },
        ] {
            assert!(matches!(
                state.inventory_api.register_part(&fleet.ctx, bad),
                Err(ApiError::InvalidInput(_))
            ));
        }

        // 兼容机型必须属于当前租户
        let other = tenant("t2");
        let err = state
            .inventory_api
            .register_part(
                &other,
                RegisterPartRequest {
                    name: "Turbo".to_string(),
                    compatible_model_ids: vec![fleet.model.model_id.clone()],
                    ..RegisterPartRequest::default()
                },
            )
            .unwrap_err();
        assert!(matches!(err, ApiError::PermissionDenied(_)));
        assert!(matches!(
            state.inventory_api.get_part(&other, &fleet.turbo_part.part_id),
            Err(ApiError::PermissionDenied(_))
        ));
    }

    #[test]
    fn test_入库_同部件同库位累加() {
        let (_tmp, state) = setup_state();
        let fleet = build_fleet(&state, "t1");

        let item = state
            .inventory_api
            .receive_stock(&fleet.ctx, &fleet.turbo_part.part_id, &fleet.location.location_id, 4, 9)
            .unwrap();
        assert_eq!(item.item_id, fleet.stock.item_id);
        assert_eq!(item.quantity, 7);
        assert_eq!(item.safety_min, 1, "安全库存仅在新建条目时生效");

        let second_location = state.inventory_api.add_location(&fleet.ctx, "Oficina Campo").unwrap();
        let other_item = state
            .inventory_api
            .receive_stock(&fleet.ctx, &fleet.turbo_part.part_id, &second_location.location_id, 1, 0)
            .unwrap();
        assert_ne!(other_item.item_id, fleet.stock.item_id);
        assert_eq!(state.inventory_api.list_stock(&fleet.ctx).unwrap().len(), 2);

        let movements = state.inventory_api.list_movements(&fleet.ctx, &fleet.stock.item_id).unwrap();
        let received: Vec<_> = movements.iter().map(|m| (m.movement_type, m.quantity)).collect();
        assert_eq!(received, vec![(MovementType::In, 4), (MovementType::In, 3)], "最新在前");
        assert_eq!(movements[0].origin.as_deref(), Some("receipt:tecnico-1"));

        assert!(matches!(
            state
                .inventory_api
                .receive_stock(&fleet.ctx, &fleet.turbo_part.part_id, &fleet.location.location_id, 0, 0),
            Err(ApiError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_盘点调整_记录差值() {
        let (_tmp, state) = setup_state();
        let fleet = build_fleet(&state, "t1");

        let item = state.inventory_api.adjust_stock(&fleet.ctx, &fleet.stock.item_id, 1).unwrap();
        assert_eq!(item.quantity, 1);

        let movements = state.inventory_api.list_movements(&fleet.ctx, &fleet.stock.item_id).unwrap();
        assert_eq!(movements[0].movement_type, MovementType::Adjust);
        assert_eq!(movements[0].quantity, -2);
        assert_eq!(movements[0].origin.as_deref(), Some("count:tecnico-1"));

        assert!(matches!(
            state.inventory_api.adjust_stock(&fleet.ctx, &fleet.stock.item_id, -1),
            Err(ApiError::InvalidInput(_))
        ));
        assert!(matches!(
            state.inventory_api.adjust_stock(&tenant("t2"), &fleet.stock.item_id, 10),
            Err(ApiError::PermissionDenied(_))
        ));
    }

    #[test]
    fn test_低库存_含配置余量() {
        let (_tmp, state) = setup_state();
        let fleet = build_fleet(&state, "t1");

        // 3 件 / 安全库存 1
        assert!(state.inventory_api.list_low_stock(&fleet.ctx).unwrap().is_empty());

        state
            .config_manager
            .set_value("t1", config_keys::STOCK_LOW_MARGIN, "2")
            .unwrap();
        let low = state.inventory_api.list_low_stock(&fleet.ctx).unwrap();
        assert_eq!(low.len(), 1);
        assert_eq!(low[0].item_id, fleet.stock.item_id);

        // 余量只影响该租户
        let other = build_fleet(&state, "t2");
        assert!(state.inventory_api.list_low_stock(&other.ctx).unwrap().is_empty());

        state
            .config_manager
            .set_value("t1", config_keys::STOCK_LOW_MARGIN, "0")
            .unwrap();
        state.inventory_api.adjust_stock(&fleet.ctx, &fleet.stock.item_id, 1).unwrap();
        assert_eq!(state.inventory_api.list_low_stock(&fleet.ctx).unwrap().len(), 1);
    }

    #[test]
    fn test_库位必须属于当前租户() {
        let (_tmp, state) = setup_state();
        let fleet = build_fleet(&state, "t1");
        let other = build_fleet(&state, "t2");

        assert!(matches!(
            state
                .inventory_api
                .receive_stock(&fleet.ctx, &fleet.turbo_part.part_id, &other.location.location_id, 1, 0),
            Err(ApiError::PermissionDenied(_))
        ));
        assert!(matches!(
            state
                .inventory_api
                .receive_stock(&fleet.ctx, &fleet.turbo_part.part_id, "missing", 1, 0),
            Err(ApiError::NotFound(_))
        ));
    }

    #[test]
    fn test_盘点差值按事务内在库数量计算() {
        let (_tmp, state) = setup_state();
        let fleet = build_fleet(&state, "t1");

        // 调用方持有的快照: 3 件
        let snapshot = state.inventory_api.get_stock_item(&fleet.ctx, &fleet.stock.item_id).unwrap();
        assert_eq!(snapshot.quantity, 3);

        // 其间一次换件消耗 1 件
        let input = MaintenanceEventInput::new(
            &fleet.engine.engine_id,
            &fleet.turbo_slot.slot_id,
            TriggerKind::Replacement,
            d(2024, 5, 10),
            1000,
        )
        .with_stock_item(&fleet.stock.item_id);
        state.maintenance_api.process_maintenance_event(&fleet.ctx, &input).unwrap();

        // 另一连接按旧快照提交盘点
        let repo = InventoryRepository::new(Arc::new(Mutex::new(open_sqlite_connection(&state.db_path).unwrap())));
        let movement = StockMovement {
            movement_id: Uuid::new_v4().to_string(),
            tenant_id: fleet.ctx.tenant_id.clone(),
            item_id: snapshot.item_id.clone(),
            movement_type: MovementType::Adjust,
            quantity: 10 - snapshot.quantity,
            moved_at: now_timestamp(),
            origin: Some("count:tecnico-2".to_string()),
        };
        let (before, item) = repo.adjust(&snapshot.item_id, 10, &movement).unwrap();
        assert_eq!(before, 2);
        assert_eq!(item.quantity, 10);

        let movements = state.inventory_api.list_movements(&fleet.ctx, &fleet.stock.item_id).unwrap();
        let adjust = movements
            .iter()
            .find(|m| m.movement_type == MovementType::Adjust)
            .unwrap();
        assert_eq!(adjust.quantity, 8);
        assert_eq!(ledger_sum(&movements), item.quantity);

        // API 路径同样满足流水合计 = 在库数量
        let item = state.inventory_api.adjust_stock(&fleet.ctx, &fleet.stock.item_id, 4).unwrap();
        let movements = state.inventory_api.list_movements(&fleet.ctx, &fleet.stock.item_id).unwrap();
        assert_eq!(movements[0].quantity, -6);
        assert_eq!(ledger_sum(&movements), item.quantity);
    }

    #[test]
    fn test_部件寿命上限超出范围被拒绝() {
        let (_tmp, state) = setup_state();
        let fleet = build_fleet(&state, "t1");

        let err = state
            .inventory_api
            .register_part(
                &fleet.ctx,
                RegisterPartRequest {
                    name: "Vela".to_string(),
                    universal: true,
                    units_per_install: 1,
                    life_months: Some(i64::MAX / 10),
                    ..RegisterPartRequest::default()
                },
            )
            .unwrap_err();
        assert!(matches!(err, ApiError::InvalidInput(_)));

        let part = state
            .inventory_api
            .register_part(
                &fleet.ctx,
                RegisterPartRequest {
                    name: "Vela".to_string(),
                    universal: true,
                    units_per_install: 1,
                    life_hours: Some(MAX_INTERVAL_VALUE),
                    ..RegisterPartRequest::default()
                },
            )
            .unwrap();
        assert_eq!(part.life_hours, Some(MAX_INTERVAL_VALUE));
    }
}
