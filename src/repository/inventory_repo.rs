// ==========================================
// 机组部件追踪系统 - 库存数据仓储
// ==========================================
// 红线: Repository 不含业务逻辑
// 职责: part_catalog / part_compatible_model / stock_location /
//       stock_item / stock_movement 表的数据访问
// ==========================================

use crate::domain::inventory::{CatalogPart, StockItem, StockLocation, StockMovement};
use crate::domain::types::MovementType;
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::sql_utils::{format_datetime, parse_datetime, parse_enum};
use rusqlite::{params, Connection, OptionalExtension, Row, TransactionBehavior};
use std::sync::{Arc, Mutex};

const PART_COLUMNS: &str = r#"
    part_id, tenant_id, name, manufacturer_code, category, universal, requires_serial,
    units_per_install, life_hours, life_starts, life_months, alert_pct
"#;

const ITEM_COLUMNS: &str = "item_id, tenant_id, part_id, location_id, quantity, safety_min";

fn map_part_row(row: &Row<'_>) -> rusqlite::Result<CatalogPart> {
    Ok(CatalogPart {
        part_id: row.get(0)?,
        tenant_id: row.get(1)?,
        name: row.get(2)?,
        manufacturer_code: row.get(3)?,
        category: row.get(4)?,
        universal: row.get(5)?,
        requires_serial: row.get(6)?,
        units_per_install: row.get(7)?,
        life_hours: row.get(8)?,
        life_starts: row.get(9)?,
        life_months: row.get(10)?,
        alert_pct: row.get(11)?,
        compatible_model_ids: Vec::new(),
    })
}

fn map_item_row(row: &Row<'_>) -> rusqlite::Result<StockItem> {
    Ok(StockItem {
        item_id: row.get(0)?,
        tenant_id: row.get(1)?,
        part_id: row.get(2)?,
        location_id: row.get(3)?,
        quantity: row.get(4)?,
        safety_min: row.get(5)?,
    })
}

// ==========================================
// 部件目录
// ==========================================

pub fn insert_part(conn: &Connection, part: &CatalogPart) -> RepositoryResult<()> {
    conn.execute(
        &format!(
            "INSERT INTO part_catalog ({}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
            PART_COLUMNS
        ),
        params![
            part.part_id,
            part.tenant_id,
            part.name,
            part.manufacturer_code,
            part.category,
            part.universal,
            part.requires_serial,
            part.units_per_install,
            part.life_hours,
            part.life_starts,
            part.life_months,
            part.alert_pct,
        ],
    )?;

    let mut stmt = conn.prepare("INSERT OR IGNORE INTO part_compatible_model (part_id, model_id) VALUES (?1, ?2)")?;
    for model_id in &part.compatible_model_ids {
        stmt.execute(params![part.part_id, model_id])?;
    }
    Ok(())
}

pub fn find_part(conn: &Connection, part_id: &str) -> RepositoryResult<Option<CatalogPart>> {
    let part = conn
        .query_row(
            &format!("SELECT {} FROM part_catalog WHERE part_id = ?1", PART_COLUMNS),
            params![part_id],
            map_part_row,
        )
        .optional()?;

    let Some(mut part) = part else {
        return Ok(None);
    };

    let mut stmt =
        conn.prepare("SELECT model_id FROM part_compatible_model WHERE part_id = ?1 ORDER BY model_id")?;
    part.compatible_model_ids = stmt
        .query_map(params![part_id], |row| row.get(0))?
        .collect::<rusqlite::Result<Vec<String>>>()?;
    Ok(Some(part))
}

// ==========================================
// 库位 / 库存条目
// ==========================================

pub fn insert_location(conn: &Connection, location: &StockLocation) -> RepositoryResult<()> {
    conn.execute(
        "INSERT INTO stock_location (location_id, tenant_id, name) VALUES (?1, ?2, ?3)",
        params![location.location_id, location.tenant_id, location.name],
    )?;
    Ok(())
}

pub fn find_location(conn: &Connection, location_id: &str) -> RepositoryResult<Option<StockLocation>> {
    let location = conn
        .query_row(
            "SELECT location_id, tenant_id, name FROM stock_location WHERE location_id = ?1",
            params![location_id],
            |row| {
                Ok(StockLocation {
                    location_id: row.get(0)?,
                    tenant_id: row.get(1)?,
                    name: row.get(2)?,
                })
            },
        )
        .optional()?;
    Ok(location)
}

pub fn insert_stock_item(conn: &Connection, item: &StockItem) -> RepositoryResult<()> {
    conn.execute(
        &format!("INSERT INTO stock_item ({}) VALUES (?1, ?2, ?3, ?4, ?5, ?6)", ITEM_COLUMNS),
        params![
            item.item_id,
            item.tenant_id,
            item.part_id,
            item.location_id,
            item.quantity,
            item.safety_min,
        ],
    )?;
    Ok(())
}

pub fn find_stock_item(conn: &Connection, item_id: &str) -> RepositoryResult<Option<StockItem>> {
    let item = conn
        .query_row(
            &format!("SELECT {} FROM stock_item WHERE item_id = ?1", ITEM_COLUMNS),
            params![item_id],
            map_item_row,
        )
        .optional()?;
    Ok(item)
}

pub fn find_stock_item_by_part_location(
    conn: &Connection,
    tenant_id: &str,
    part_id: &str,
    location_id: &str,
) -> RepositoryResult<Option<StockItem>> {
    let item = conn
        .query_row(
            &format!(
                "SELECT {} FROM stock_item WHERE tenant_id = ?1 AND part_id = ?2 AND location_id = ?3",
                ITEM_COLUMNS
            ),
            params![tenant_id, part_id, location_id],
            map_item_row,
        )
        .optional()?;
    Ok(item)
}

pub fn list_stock_items_by_tenant(conn: &Connection, tenant_id: &str) -> RepositoryResult<Vec<StockItem>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM stock_item WHERE tenant_id = ?1 ORDER BY part_id, location_id",
        ITEM_COLUMNS
    ))?;
    let items = stmt
        .query_map(params![tenant_id], map_item_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(items)
}

/// 带下限检查的扣减: 单条 UPDATE，数量不足时不修改任何行
///
/// # 返回
/// - Ok(true): 扣减成功
/// - Ok(false): 在库数量不足（或条目不存在）
pub fn decrement_quantity(conn: &Connection, item_id: &str, quantity: i64) -> RepositoryResult<bool> {
    let updated = conn.execute(
        "UPDATE stock_item SET quantity = quantity - ?2 WHERE item_id = ?1 AND quantity >= ?2",
        params![item_id, quantity],
    )?;
    Ok(updated > 0)
}

pub fn increment_quantity(conn: &Connection, item_id: &str, quantity: i64) -> RepositoryResult<()> {
    let updated = conn.execute(
        "UPDATE stock_item SET quantity = quantity + ?2 WHERE item_id = ?1",
        params![item_id, quantity],
    )?;
    if updated == 0 {
        return Err(RepositoryError::not_found("StockItem", item_id));
    }
    Ok(())
}

pub fn set_quantity(conn: &Connection, item_id: &str, quantity: i64) -> RepositoryResult<()> {
    let updated = conn.execute(
        "UPDATE stock_item SET quantity = ?2 WHERE item_id = ?1",
        params![item_id, quantity],
    )?;
    if updated == 0 {
        return Err(RepositoryError::not_found("StockItem", item_id));
    }
    Ok(())
}

// ==========================================
// 库存流水
// ==========================================

pub fn insert_movement(conn: &Connection, movement: &StockMovement) -> RepositoryResult<()> {
    conn.execute(
        r#"
        INSERT INTO stock_movement (movement_id, tenant_id, item_id, movement_type, quantity, moved_at, origin)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
        "#,
        params![
            movement.movement_id,
            movement.tenant_id,
            movement.item_id,
            movement.movement_type.to_db_str(),
            movement.quantity,
            format_datetime(movement.moved_at),
            movement.origin,
        ],
    )?;
    Ok(())
}

/// 按时间倒序列出某库存条目的流水
pub fn list_movements_by_item(conn: &Connection, item_id: &str) -> RepositoryResult<Vec<StockMovement>> {
    let mut stmt = conn.prepare(
        r#"
        SELECT movement_id, tenant_id, item_id, movement_type, quantity, moved_at, origin
        FROM stock_movement
        WHERE item_id = ?1
        ORDER BY moved_at DESC, rowid DESC
        "#,
    )?;
    let movements = stmt
        .query_map(params![item_id], |row| {
            Ok(StockMovement {
                movement_id: row.get(0)?,
                tenant_id: row.get(1)?,
                item_id: row.get(2)?,
                movement_type: parse_enum(3, &row.get::<_, String>(3)?, MovementType::from_db_str)?,
                quantity: row.get(4)?,
                moved_at: parse_datetime(5, &row.get::<_, String>(5)?)?,
                origin: row.get(6)?,
            })
        })?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(movements)
}

// ==========================================
// InventoryRepository - 库存仓储
// ==========================================
pub struct InventoryRepository {
    conn: Arc<Mutex<Connection>>,
}

impl InventoryRepository {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    pub fn create_part(&self, part: &CatalogPart) -> RepositoryResult<()> {
        let mut conn = self.get_conn()?;
        let tx = conn.transaction()?;
        insert_part(&tx, part)?;
        tx.commit()?;
        Ok(())
    }

    pub fn find_part(&self, part_id: &str) -> RepositoryResult<Option<CatalogPart>> {
        let conn = self.get_conn()?;
        find_part(&conn, part_id)
    }

    pub fn create_location(&self, location: &StockLocation) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        insert_location(&conn, location)
    }

    pub fn find_location(&self, location_id: &str) -> RepositoryResult<Option<StockLocation>> {
        let conn = self.get_conn()?;
        find_location(&conn, location_id)
    }

    pub fn find_item(&self, item_id: &str) -> RepositoryResult<Option<StockItem>> {
        let conn = self.get_conn()?;
        find_stock_item(&conn, item_id)
    }

    pub fn list_items(&self, tenant_id: &str) -> RepositoryResult<Vec<StockItem>> {
        let conn = self.get_conn()?;
        list_stock_items_by_tenant(&conn, tenant_id)
    }

    pub fn list_movements(&self, item_id: &str) -> RepositoryResult<Vec<StockMovement>> {
        let conn = self.get_conn()?;
        list_movements_by_item(&conn, item_id)
    }

    /// 入库: 条目不存在则新建，数量累加并记录 IN 流水（同一事务）
    pub fn receive(
        &self,
        new_item: &StockItem,
        movement: &StockMovement,
    ) -> RepositoryResult<StockItem> {
        let mut conn = self.get_conn()?;
        let tx = conn.transaction()?;

        let item_id = match find_stock_item_by_part_location(
            &tx,
            &new_item.tenant_id,
            &new_item.part_id,
            &new_item.location_id,
        )? {
            Some(existing) => {
                increment_quantity(&tx, &existing.item_id, movement.quantity)?;
                existing.item_id
            }
            None => {
                let mut item = new_item.clone();
                item.quantity = movement.quantity;
                insert_stock_item(&tx, &item)?;
                item.item_id
            }
        };

        let movement = StockMovement {
            item_id: item_id.clone(),
            ..movement.clone()
        };
        insert_movement(&tx, &movement)?;

        let item = find_stock_item(&tx, &item_id)?
            .ok_or_else(|| RepositoryError::not_found("StockItem", &item_id))?;
        tx.commit()?;
        Ok(item)
    }

    /// 盘点: 覆写数量并记录 ADJUST 流水
    ///
    /// 差值按事务内读到的在库数量计算（IMMEDIATE，BEGIN 即持有写锁），
    /// 并发的维护事件扣减不会使流水合计偏离在库数量
    ///
    /// # 返回
    /// - (盘点前数量, 盘点后条目)
    pub fn adjust(
        &self,
        item_id: &str,
        new_quantity: i64,
        movement: &StockMovement,
    ) -> RepositoryResult<(i64, StockItem)> {
        let mut conn = self.get_conn()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        let before = find_stock_item(&tx, item_id)?
            .ok_or_else(|| RepositoryError::not_found("StockItem", item_id))?
            .quantity;
        set_quantity(&tx, item_id, new_quantity)?;
        let movement = StockMovement {
            quantity: new_quantity - before,
            ..movement.clone()
        };
        insert_movement(&tx, &movement)?;

        let item = find_stock_item(&tx, item_id)?
            .ok_or_else(|| RepositoryError::not_found("StockItem", item_id))?;
        tx.commit()?;
        Ok((before, item))
    }
}
